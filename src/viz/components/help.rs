use ratatui::{prelude::*, widgets::*};

use crate::viz::util::centered;

fn key<'a>(key: &'a str, action: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::from(key).light_cyan().bold(),
        Span::raw(" : "),
        Span::raw(action),
    ])
}

pub fn render_help(area: Rect, buf: &mut Buffer, selected_tab: usize) {
    let mut lines = vec![
        key("  q  ", "Stop and exit"),
        key("  h  ", "Toggle help popup"),
        key(" Tab ", "Switch tabs"),
        key("Enter", "Continue when prompted"),
    ];

    if selected_tab == 1 {
        lines.extend([
            key("  s  ", "Toggles target selector widget hidden/visible"),
            key("  f  ", "Toggle focus on the selected target only"),
            key("⬆ / ⬇", "Switch log target"),
            key("⬅ / ➡", "Reduce/increase shown log messages by one level"),
            key("- / +", "Reduce/increase captured log messages by one level"),
            key("PgUp ", "Enter page mode and scroll up in log history"),
            key("PgDn ", "Only in page mode, scroll down in log history"),
            key(" Esc ", "Exit page mode"),
        ]);
    }

    let popup = centered(area, 72.min(area.width), (lines.len() as u16 + 4).min(area.height));
    Clear.render(popup, buf);

    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .padding(Padding::horizontal(1))
                .title("Help"),
        )
        .wrap(Wrap { trim: false })
        .render(popup, buf);
}

pub fn render_prompt(area: Rect, buf: &mut Buffer, message: &str) {
    let lines = vec![
        Line::from(message.to_owned()).bold(),
        Line::default(),
        Line::from(vec![
            Span::from("Enter").light_cyan().bold(),
            Span::raw(" to continue, "),
            Span::from("q").light_cyan().bold(),
            Span::raw(" to quit"),
        ]),
    ];
    let width = (message.chars().count() as u16 + 6).max(34).min(area.width);
    let popup = centered(area, width, 5.min(area.height));
    Clear.render(popup, buf);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::bordered().border_type(BorderType::Rounded))
        .render(popup, buf);
}
