//! Recipe list widget for the browse view.

use crate::api::Recipe;
use crate::app::App;
use crate::util::{single_line, truncate_to_width};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Format a timestamp as relative time for list display.
pub(super) fn format_relative_time(dt: DateTime<Utc>) -> String {
    let diff = Utc::now().signed_duration_since(dt).num_seconds();

    // Future dates (clock skew)
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }
    dt.format("%b %d").to_string()
}

/// Render the recipe list panel.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = if app.filtered.is_empty() {
        let placeholder = if app.collection.is_empty() {
            "No recipes yet — press [n] to add one"
        } else {
            "No recipes match the current filter"
        };
        vec![ListItem::new(placeholder)]
    } else {
        app.filtered
            .iter()
            .enumerate()
            .map(|(i, recipe)| list_item(app, recipe, i, area.width))
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(panel_title(app)),
    );
    f.render_widget(list, area);
}

fn list_item<'a>(app: &App, recipe: &'a Recipe, index: usize, width: u16) -> ListItem<'a> {
    let time_str = format_relative_time(recipe.updated_at);

    let title_style = if index == app.selected {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    // Leave room for the cuisine tag and timestamp
    let max_title = usize::from(width.saturating_sub(24));
    let title = truncate_to_width(&single_line(&recipe.title), max_title).into_owned();

    let mut spans = vec![Span::styled(title, title_style)];
    if !recipe.cuisine().is_empty() {
        spans.push(Span::styled(
            format!("  [{}]", recipe.cuisine()),
            Style::default().fg(Color::Cyan),
        ));
    }
    spans.push(Span::styled(
        format!("  {}", time_str),
        Style::default().fg(Color::DarkGray),
    ));

    ListItem::new(Line::from(spans))
}

/// Panel title showing the active filters and match count.
fn panel_title(app: &App) -> String {
    if app.search_mode {
        return format!("Search: {}_", app.search_input);
    }

    let user = app.auth.username();
    let mut title = if user.is_empty() {
        format!("Recipes ({})", app.filtered.len())
    } else {
        format!("{}'s recipes ({})", user, app.filtered.len())
    };
    if !app.debounced_search.is_empty() {
        title.push_str(&format!(" — \"{}\"", app.debounced_search));
    }
    match app.cuisine_filter() {
        "" => {}
        cuisine => title.push_str(&format!(" — {}", cuisine)),
    }
    if let Some((msg, _)) = &app.status_message {
        // Keep pick results visible next to the list they refer to
        if msg.starts_with("Picked:") {
            title.push_str(&format!("  {}", msg));
        }
    }
    title
}
