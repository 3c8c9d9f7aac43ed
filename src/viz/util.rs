use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{layout::Flex, prelude::*};

/// Takes an event, checks if it is a key press event, and returns the [`KeyCode`]
pub(super) fn event_keycode(event: &Event) -> Option<KeyCode> {
    let Event::Key(key) = event else {
        return None;
    };

    if key.kind != KeyEventKind::Press {
        return None;
    }

    Some(key.code)
}

/// Axis bounds that always span a non-empty range
///
/// Unset bounds (`lo > hi`) become `[0, 1]` and a single value is padded by `0.5` either side
pub(super) fn padded_bounds([lo, hi]: [f64; 2]) -> [f64; 2] {
    if lo > hi {
        [0.0, 1.0]
    } else if lo == hi {
        [lo - 0.5, hi + 0.5]
    } else {
        [lo, hi]
    }
}

/// Low, middle and high labels for an axis
pub(super) fn axis_labels<'a>([lo, hi]: [f64; 2], precision: usize) -> Vec<Span<'a>> {
    [lo, (lo + hi) / 2.0, hi]
        .iter()
        .map(|x| format!("{x:.precision$}").bold())
        .collect()
}

/// A `width` × `height` rectangle centred in `area`
pub(super) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [vert] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [center] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(vert);
    center
}
