use crossterm::event::{Event, KeyCode};
use log::LevelFilter;
use ratatui::{prelude::*, widgets::WidgetRef};
use tui_logger::{TuiLoggerSmartWidget, TuiWidgetEvent, TuiWidgetState};

use crate::viz::util::event_keycode;

use super::Component;

/// Target selector and log view over everything captured by `tui-logger`
pub struct Logs {
    state: TuiWidgetState,
}

impl Default for Logs {
    fn default() -> Self {
        Self::new(LevelFilter::Info)
    }
}

impl Logs {
    /// Shows messages up to `level` until changed with the arrow keys
    pub fn new(level: LevelFilter) -> Self {
        Self {
            state: TuiWidgetState::new().set_default_display_level(level),
        }
    }
}

impl WidgetRef for Logs {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        TuiLoggerSmartWidget::default()
            .title_log("Training Log")
            .title_target("Targets")
            .style(Style::default().white())
            .style_error(Style::default().light_red())
            .style_warn(Style::default().light_yellow())
            .style_info(Style::default().cyan())
            .style_debug(Style::default().dark_gray())
            .output_separator(' ')
            .state(&self.state)
            .render(area, buf);
    }
}

impl Component for Logs {
    fn handle_ui_event(&mut self, event: &Event) {
        if let Some(widget_event) = event_keycode(event).and_then(widget_event) {
            self.state.transition(widget_event);
        }
    }
}

fn widget_event(key: KeyCode) -> Option<TuiWidgetEvent> {
    let event = match key {
        KeyCode::Esc => TuiWidgetEvent::EscapeKey,
        KeyCode::PageUp => TuiWidgetEvent::PrevPageKey,
        KeyCode::PageDown => TuiWidgetEvent::NextPageKey,
        KeyCode::Up => TuiWidgetEvent::UpKey,
        KeyCode::Down => TuiWidgetEvent::DownKey,
        KeyCode::Left => TuiWidgetEvent::LeftKey,
        KeyCode::Right => TuiWidgetEvent::RightKey,
        KeyCode::Char('=' | '+') => TuiWidgetEvent::PlusKey,
        KeyCode::Char('-' | '_') => TuiWidgetEvent::MinusKey,
        KeyCode::Char('s') => TuiWidgetEvent::HideKey,
        KeyCode::Char('f') => TuiWidgetEvent::FocusKey,
        _ => return None,
    };
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_keys_pass_through() {
        for key in [KeyCode::Char('q'), KeyCode::Char('h'), KeyCode::Tab, KeyCode::Enter] {
            assert!(widget_event(key).is_none(), "{key:?} is not a log key");
        }
        assert!(matches!(
            widget_event(KeyCode::Char('+')),
            Some(TuiWidgetEvent::PlusKey)
        ));
    }
}
