//! Single-recipe detail view.

use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the full recipe for the detail view.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let Some(recipe) = app.detail.as_ref() else {
        let placeholder = Paragraph::new("Loading recipe...")
            .block(Block::default().borders(Borders::ALL).title("Recipe"));
        f.render_widget(placeholder, area);
        return;
    };

    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let meta_style = Style::default().fg(Color::DarkGray);

    let mut lines = vec![Line::from(Span::styled(recipe.title.clone(), header_style))];

    let mut meta = Vec::new();
    if !recipe.cuisine().is_empty() {
        meta.push(recipe.cuisine().to_string());
    }
    if let Some(owner) = recipe.username.as_deref() {
        meta.push(format!("by {owner}"));
    }
    meta.push(format!("updated {}", recipe.updated_at.format("%Y-%m-%d")));
    lines.push(Line::from(Span::styled(meta.join("  ·  "), meta_style)));
    lines.push(Line::default());

    if let Some(description) = recipe.description.as_deref() {
        for text_line in description.lines() {
            lines.push(Line::from(text_line.to_string()));
        }
        lines.push(Line::default());
    }

    lines.push(Line::from(Span::styled("Ingredients", header_style)));
    for ingredient in recipe.ingredients.lines() {
        lines.push(Line::from(format!("  {}", ingredient)));
    }
    lines.push(Line::default());

    lines.push(Line::from(Span::styled("Instructions", header_style)));
    for step in recipe.instructions.lines() {
        lines.push(Line::from(format!("  {}", step)));
    }

    if let Some(link) = recipe.external_link.as_deref() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("Link: {link}  ([o] to open)"),
            meta_style,
        )));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Recipe"));
    f.render_widget(paragraph, area);
}
