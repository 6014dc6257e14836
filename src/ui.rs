use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, HitMap};
use crate::modules::dialog::{Dialog, DialogContent};
use crate::modules::history::HistoryItemView;
use crate::modules::panel::{BlockListPanel, HistoryPanel, Panel, PanelTab, EMPTY_BLOCK_LIST, NO_NOTIFICATIONS};
use crate::modules::toastr::Level;

const TOAST_WIDTH: u16 = 40;
const TOAST_HEIGHT: u16 = 4;

pub fn draw(f: &mut Frame, app: &mut App) {
    app.hits = HitMap { screen: f.area(), ..Default::default() };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_title(f, chunks[0], app);
    draw_main(f, chunks[1], app);
    draw_status(f, app, chunks[2]);

    if app.state == AppState::Command {
        draw_input_popup(f, app);
    } else if app.state == AppState::Dialog {
        draw_dialog(f, app);
    } else if app.show_help {
        draw_help_popup(f);
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Info => Color::Cyan,
        Level::Success => Color::Green,
        Level::Warning => Color::Yellow,
        Level::Error => Color::Red,
    }
}

fn level_icon(level: Level) -> &'static str {
    match level {
        Level::Info => "ℹ️",
        Level::Success => "✅",
        Level::Warning => "⚠️",
        Level::Error => "❌",
    }
}

fn draw_title(f: &mut Frame, area: Rect, app: &mut App) {
    let overlay = app.overlay.borrow();
    let mut spans = vec![Span::styled(
        "Toast History ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    for level in Level::ALL {
        let count = overlay.counters.count(level);
        let style = if overlay.counters.is_active(level) {
            Style::default().fg(level_color(level)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} {} ", level_icon(level), count), style));
    }
    spans.push(Span::raw(format!(
        " | {} recorded | {}",
        overlay.history.len(),
        app.trigger_summary().replace('\n', ", ")
    )));
    drop(overlay);

    let title = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
    app.hits.trigger = area;
}

fn draw_main(f: &mut Frame, area: Rect, app: &mut App) {
    let (empty, recent): (bool, Vec<Line>) = {
        let overlay = app.overlay.borrow();
        let lines = overlay
            .history
            .iter()
            .rev()
            .take(area.height.saturating_sub(2) as usize)
            .map(|r| {
                Line::from(vec![
                    Span::raw(format!("{} [{}] ", level_icon(r.level), r.timestamp.format("%H:%M:%S"))),
                    Span::styled(plain_text(&r.content), Style::default().fg(level_color(r.level))),
                ])
            })
            .collect();
        (overlay.history.is_empty(), lines)
    };

    let body = if empty {
        Paragraph::new("No toasts recorded yet. Try ':toast error Connection lost'")
    } else {
        Paragraph::new(recent)
    };
    f.render_widget(body.block(Block::default().title("Recent").borders(Borders::ALL)), area);

    // Live toasts stack in the top-right corner, newest on top.
    let width = TOAST_WIDTH.min(area.width.saturating_sub(2));
    let mut y = area.y + 1;
    let live: Vec<_> = app.toastr.live().cloned().enumerate().collect();
    for (index, handle) in live.into_iter().rev() {
        if y + TOAST_HEIGHT > area.y + area.height {
            break;
        }
        let toast = handle.borrow();
        let rect = Rect::new(area.x + area.width.saturating_sub(width + 1), y, width, TOAST_HEIGHT);
        let text = toast.message.as_deref().map(plain_text).unwrap_or_default();
        let widget = Paragraph::new(text)
            .block(
                Block::default()
                    .title(toast.title.clone().unwrap_or_else(|| toast.level.to_string()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(level_color(toast.level))),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, rect);
        f.render_widget(widget, rect);
        app.hits.live_toasts.push((rect, index));
        y += TOAST_HEIGHT;
    }
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.state {
        AppState::Normal => "q: Quit | h/Enter: History | :: Command | ?: Help | click a toast to run its action",
        AppState::Command => "Enter: Run | Esc: Cancel | Type a command",
        AppState::Dialog => "Tab: History/Block list | ↑↓: Navigate | s/click: Suppress | d/hold: Delete | 0-4/f: Filter",
    };

    let message = if app.gesture.is_pending() {
        "Release to suppress, keep holding to remove"
    } else {
        app.status_message.as_str()
    };
    let status = Paragraph::new(vec![
        Line::from(message),
        Line::from(help_text),
    ])
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(status, area);
}

fn draw_input_popup(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 20, f.area());
    let input_text = format!(":{}", app.input_buffer);
    let input = Paragraph::new(input_text)
        .block(
            Block::default()
                .title("Command")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(input, area);
}

fn draw_dialog(f: &mut Frame, app: &mut App) {
    let Some(dialog) = app.dialog.as_ref() else { return };
    let area = if dialog.options.wide { centered_rect(90, 80, f.area()) } else { centered_rect(60, 40, f.area()) };
    f.render_widget(Clear, area);

    let outer = Block::default()
        .title(dialog.title.as_str())
        .title_bottom(Line::from(dialog.buttons_hint()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    match &dialog.content {
        DialogContent::Alert(message) => draw_alert(f, inner, dialog, message),
        DialogContent::Panel(panel) => draw_panel(f, inner, panel, &mut app.hits),
    }
}

fn draw_alert(f: &mut Frame, area: Rect, dialog: &Dialog, message: &str) {
    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: false })
        .scroll((dialog.scroll, 0));
    f.render_widget(text, area);
}

fn draw_panel(f: &mut Frame, area: Rect, panel: &Panel, hits: &mut HitMap) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    let tab_style = |tab: PanelTab| {
        if panel.tab == tab {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let mut header = Vec::new();
    if panel.history.is_some() {
        header.push(Span::styled("History", tab_style(PanelTab::History)));
        header.push(Span::raw("  "));
    }
    header.push(Span::styled("Block list", tab_style(PanelTab::BlockList)));
    if let (PanelTab::History, Some(history)) = (panel.tab, panel.history.as_ref()) {
        header.push(Span::raw(format!("   filter: {}", history.filter.label())));
    }
    f.render_widget(Paragraph::new(Line::from(header)), parts[0]);

    match (panel.tab, panel.history.as_ref()) {
        (PanelTab::History, Some(history)) => draw_history(f, parts[1], history, hits),
        _ => draw_block_list(f, parts[1], &panel.blocks, hits),
    }
}

fn draw_history(f: &mut Frame, area: Rect, history: &HistoryPanel, hits: &mut HitMap) {
    if history.is_empty() {
        let empty = Paragraph::new(NO_NOTIFICATIONS).style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, area);
        return;
    }

    let per_page = (area.height / 2).max(1) as usize;
    let start = history.selected.saturating_sub(per_page / 2);
    let start = start.min(history.items.len().saturating_sub(per_page));
    for (offset, item) in history.items.iter().skip(start).take(per_page).enumerate() {
        let rect = Rect::new(area.x, area.y + (offset as u16) * 2, area.width, 2);
        let selected = start + offset == history.selected;
        f.render_widget(Paragraph::new(history_lines(item, selected)), rect);
        hits.history_rows.push((rect, item.id));
    }
}

// Rows are redrawn from the stored snapshot, coloured by its `toast-<level>` class.
fn history_lines(item: &HistoryItemView, selected: bool) -> Vec<Line<'static>> {
    let color = level_color(item.class_level().unwrap_or(item.level));
    let mut head = Style::default().fg(color).add_modifier(Modifier::BOLD);
    let mut body = Style::default().fg(color);
    if item.suppressed {
        head = Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
        body = head;
    }
    if selected {
        head = head.bg(Color::DarkGray).fg(Color::Yellow);
    }

    let mut spans = vec![Span::styled(
        format!("{} {}", level_icon(item.level), plain_text(&item.heading())),
        head,
    )];
    spans.push(Span::styled(
        format!("  {}", item.timestamp.format("%Y-%m-%d %H:%M:%S")),
        Style::default().fg(Color::DarkGray),
    ));
    if item.clickable() {
        spans.push(Span::styled("  👆 Enter to click", Style::default().fg(Color::Magenta)));
    }
    if item.suppressed {
        spans.push(Span::styled("  ⊘ suppressed", Style::default().fg(Color::Red)));
    }
    let message = item.snapshot.message.as_deref().map(plain_text).unwrap_or_default();
    vec![Line::from(spans), Line::from(Span::styled(format!("   {}", message), body))]
}

fn draw_block_list(f: &mut Frame, area: Rect, blocks: &BlockListPanel, hits: &mut HitMap) {
    if blocks.is_empty() {
        let empty = Paragraph::new(EMPTY_BLOCK_LIST).style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, area);
        return;
    }

    let header = Paragraph::new(Line::from(Span::styled(
        format!("{:<10}{}", "Severity", "Message"),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    f.render_widget(header, Rect::new(area.x, area.y, area.width, 1));

    let rows_area = Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(1));
    let per_page = rows_area.height.max(1) as usize;
    let start = blocks.selected.saturating_sub(per_page / 2).min(blocks.rows.len().saturating_sub(per_page));
    for (offset, entry) in blocks.rows.iter().enumerate().skip(start).take(per_page) {
        let rect = Rect::new(rows_area.x, rows_area.y + (offset - start) as u16, rows_area.width, 1);
        let style = if offset == blocks.selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let line = Line::from(vec![
            Span::styled(format!("{:<10}", entry.level.as_str()), Style::default().fg(level_color(entry.level))),
            Span::styled(plain_text(&entry.text_content), style),
            Span::styled("  🗑", Style::default().fg(Color::Red)),
        ]);
        f.render_widget(Paragraph::new(line), rect);
        hits.block_rows.push((rect, offset));
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn draw_help_popup(f: &mut Frame) {
    let area = centered_rect(70, 70, f.area());
    let help = "Toast History Help\n\nKeys:\n  q: Quit\n  h or Enter: Open history panel\n  :: Command prompt (try :help)\n  ?: Toggle this help\n\nIn the panel:\n  Tab: Switch between history and block list\n  j/k or ↑/↓: Navigate\n  s, Space or click: Suppress / unsuppress toasts like this one\n  d, Delete or hold the mouse: Remove entry\n  Enter: Run the toast's click action\n  0: All levels, 1-4: info/success/warning/error, f: Cycle filter\n  r: Refresh\n  C: Clear history\n  Esc: Close";

    let paragraph = Paragraph::new(help)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

/// Drops markup tags and decodes the common entities for terminal display.
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
