use crate::app::{App, View};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    // Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Use Cow to avoid allocations for static strings and borrowed messages
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        // Static keybinding hints - zero allocation
        match app.view {
            View::Browse => {
                if app.search_mode {
                    Cow::Borrowed("Type to search | ESC cancel | ENTER confirm")
                } else {
                    Cow::Borrowed(
                        "[/]search [c]uisine [p]ick [n]ew [e]dit [d]elete [r]efresh [a]ccount [x]logout [q]uit",
                    )
                }
            }
            View::Detail => Cow::Borrowed("[b]ack [e]dit [d]elete [o]pen link [q]uit"),
            View::Login => Cow::Borrowed(""),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}
