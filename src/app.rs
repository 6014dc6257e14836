use anyhow::{bail, Result};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::config::Config;
use crate::modules::{
    commands::CommandRegistry,
    dialog::{Dialog, DialogResult},
    gesture::{Gesture, LongPress},
    history::{HistoryBuffer, LevelFilter, RecordId},
    interceptor::Interceptor,
    overlay::ToastHistory,
    panel::{Panel, PanelTab},
    settings::{Settings, SettingsSink},
    suppression::SuppressionEngine,
    toastr::{ClickHandler, Level, ToastOptions, Toastr},
};

pub const MIN_PANEL_WIDTH: u16 = 40;
pub const MIN_PANEL_HEIGHT: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Normal,
    Command,
    Dialog,
}

/// Screen regions from the last draw, used for mouse hit-testing.
#[derive(Debug, Default)]
pub struct HitMap {
    pub screen: Rect,
    pub trigger: Rect,
    pub history_rows: Vec<(Rect, RecordId)>,
    pub block_rows: Vec<(Rect, usize)>,
    pub live_toasts: Vec<(Rect, usize)>,
}

impl HitMap {
    fn history_row(&self, x: u16, y: u16) -> Option<RecordId> {
        self.history_rows.iter().find(|(r, _)| contains(r, x, y)).map(|(_, id)| *id)
    }

    fn block_row(&self, x: u16, y: u16) -> Option<usize> {
        self.block_rows.iter().find(|(r, _)| contains(r, x, y)).map(|(_, i)| *i)
    }

    fn live_toast(&self, x: u16, y: u16) -> Option<usize> {
        self.live_toasts.iter().find(|(r, _)| contains(r, x, y)).map(|(_, i)| *i)
    }
}

fn contains(r: &Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x.saturating_add(r.width) && y >= r.y && y < r.y.saturating_add(r.height)
}

pub struct App {
    pub state: AppState,
    pub toastr: Toastr,
    pub overlay: Rc<RefCell<ToastHistory>>,
    pub commands: CommandRegistry<App>,
    pub dialog: Option<Dialog>,
    pub input_buffer: String,
    pub input_cursor: usize,
    pub status_message: String,
    pub show_help: bool,
    pub gesture: LongPress<RecordId>,
    pub hits: HitMap,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, settings: Settings, sink: Box<dyn SettingsSink>) -> Result<Self> {
        let engine = SuppressionEngine::new(settings, sink);
        let overlay = Rc::new(RefCell::new(ToastHistory::new(engine, HistoryBuffer::new(config.history_limit))));
        let mut toastr = Toastr::new(config.toast_timeout(), config.max_live_toasts);

        let status_message = if config.enabled {
            Interceptor::install(&mut toastr, overlay.clone(), &config.capture_levels)?;
            String::from("Toast history ready. Press ':' for commands, 'h' for history, '?' for help")
        } else {
            log::info!("toast history disabled by config, interceptor not installed");
            String::from("Toast history capture is disabled in config")
        };

        let mut commands = CommandRegistry::new();
        commands.register("toasthistory-blocks", "Manage toasts excluded from Toast History.", cmd_blocks)?;
        commands.register("toasthistory", "Open the Toast History panel.", cmd_history)?;
        commands.register("toast", "Show a toast: <level> [--click] <message> [| title]", cmd_toast)?;
        commands.register("help", "List commands.", cmd_help)?;

        Ok(Self {
            state: AppState::Normal,
            gesture: LongPress::new(config.long_press()),
            toastr,
            overlay,
            commands,
            dialog: None,
            input_buffer: String::new(),
            input_cursor: 0,
            status_message,
            show_help: false,
            hits: HitMap::default(),
            should_quit: false,
        })
    }

    pub fn trigger_summary(&self) -> String {
        self.overlay.borrow().counters.summary()
    }

    pub fn emit(&mut self, level: Level, message: &str, title: Option<&str>, options: ToastOptions) {
        self.toastr.notify(level, message, title, options);
    }

    pub fn report_error(&mut self, context: &str, err: anyhow::Error) {
        let msg = format!("{}: {:#}", context, err);
        log::error!("{}", msg);
        self.status_message = msg.clone();
        self.toastr.error(&msg, Some(context), ToastOptions::default());
    }

    // Dialogs

    pub fn open_history_panel(&mut self) -> Result<()> {
        self.ensure_room()?;
        let panel = Panel::combined(&self.overlay.borrow());
        self.show_dialog(Dialog::history(panel));
        Ok(())
    }

    pub fn open_block_list(&mut self) -> Result<()> {
        self.ensure_room()?;
        let panel = Panel::block_list(&self.overlay.borrow());
        self.show_dialog(Dialog::block_list(panel));
        Ok(())
    }

    /// Opens the combined panel, or explains why it could not be opened.
    pub fn open_trigger(&mut self) {
        if let Err(e) = self.open_history_panel() {
            log::error!("failed to open toast history panel: {:#}", e);
            self.alert("Toast History", format!("Failed to open the Toast History panel.\n\n{:#}", e));
        }
    }

    fn ensure_room(&self) -> Result<()> {
        let screen = self.hits.screen;
        // Before the first draw the size is unknown.
        if screen.width == 0 && screen.height == 0 {
            return Ok(());
        }
        if screen.width < MIN_PANEL_WIDTH || screen.height < MIN_PANEL_HEIGHT {
            bail!("Terminal is {}x{}, need at least {}x{}", screen.width, screen.height, MIN_PANEL_WIDTH, MIN_PANEL_HEIGHT);
        }
        Ok(())
    }

    fn show_dialog(&mut self, dialog: Dialog) {
        self.gesture.cancel();
        self.dialog = Some(dialog);
        self.state = AppState::Dialog;
    }

    pub fn alert(&mut self, title: &str, message: String) {
        self.show_dialog(Dialog::alert(title, message));
    }

    pub fn close_dialog(&mut self, result: DialogResult) {
        let Some(mut dialog) = self.dialog.take() else {
            self.state = AppState::Normal;
            return;
        };
        self.gesture.cancel();
        self.state = AppState::Normal;
        if result == DialogResult::Affirmative && dialog.can_affirm() {
            if let Some(panel) = dialog.panel_mut() {
                panel.clear(&mut *self.overlay.borrow_mut());
                self.status_message = "Toast history cleared".to_string();
            }
        }
    }

    fn with_panel<R>(&mut self, f: impl FnOnce(&mut Panel, &mut ToastHistory) -> R) -> Option<R> {
        let panel = self.dialog.as_mut()?.panel_mut()?;
        let mut overlay = self.overlay.borrow_mut();
        Some(f(panel, &mut *overlay))
    }

    fn panel(&self) -> Option<&Panel> {
        self.dialog.as_ref()?.panel()
    }

    fn panel_tab(&self) -> Option<PanelTab> {
        self.panel().map(|p| p.tab)
    }

    // Panel actions

    pub fn panel_next(&mut self) {
        self.gesture.cancel();
        self.with_panel(|panel, _| match panel.tab {
            PanelTab::History => { if let Some(h) = panel.history.as_mut() { h.select_next() } }
            PanelTab::BlockList => panel.blocks.select_next(),
        });
    }

    pub fn panel_previous(&mut self) {
        self.gesture.cancel();
        self.with_panel(|panel, _| match panel.tab {
            PanelTab::History => { if let Some(h) = panel.history.as_mut() { h.select_previous() } }
            PanelTab::BlockList => panel.blocks.select_previous(),
        });
    }

    pub fn panel_switch_tab(&mut self) {
        self.gesture.cancel();
        self.with_panel(|panel, _| panel.switch_tab());
    }

    pub fn set_filter(&mut self, filter: LevelFilter) {
        self.gesture.cancel();
        self.with_panel(|panel, overlay| {
            if let Some(h) = panel.history.as_mut() { h.set_filter(filter, overlay) }
        });
        self.status_message = format!("Showing {} toasts", filter.label());
    }

    pub fn cycle_filter(&mut self) {
        let current = self.panel().and_then(|p| p.history.as_ref()).map(|h| h.filter);
        if let Some(filter) = current {
            self.set_filter(filter.next());
        }
    }

    pub fn refresh_panel(&mut self) {
        self.gesture.cancel();
        self.with_panel(|panel, overlay| {
            if let Some(h) = panel.history.as_mut() { h.refresh(overlay) }
            panel.blocks.rebuild(&overlay.engine);
        });
    }

    /// Short press on a history row.
    pub fn toggle_record(&mut self, id: RecordId) {
        if let Some(Some(suppressed)) = self.with_panel(|panel, overlay| panel.toggle_item(overlay, id)) {
            let blocked = self.overlay.borrow().engine.len();
            self.status_message = if suppressed {
                format!("Suppressed: matching toasts will no longer show up in the history ({} blocked)", blocked)
            } else {
                format!("Unsuppressed: matching toasts will show up in the history again ({} blocked)", blocked)
            };
        }
    }

    /// Long press on a history row.
    pub fn remove_record(&mut self, id: RecordId) {
        if let Some(true) = self.with_panel(|panel, overlay| panel.remove_item(overlay, id)) {
            self.status_message = "Removed toast from history".to_string();
        }
    }

    pub fn delete_block(&mut self, index: usize) {
        if let Some(Some(fp)) = self.with_panel(|panel, overlay| panel.delete_block(overlay, index)) {
            self.status_message = format!("Removed {} '{}' from block list", fp.level, fp.content);
        }
    }

    fn selected_record(&self) -> Option<RecordId> {
        self.panel()?.history.as_ref()?.selected_item().map(|i| i.id)
    }

    fn selected_block(&self) -> Option<usize> {
        let panel = self.panel()?;
        if panel.blocks.is_empty() { None } else { Some(panel.blocks.selected) }
    }

    pub fn toggle_selected(&mut self) {
        self.gesture.cancel();
        if self.panel_tab() == Some(PanelTab::History) {
            if let Some(id) = self.selected_record() { self.toggle_record(id); }
        }
    }

    pub fn delete_selected(&mut self) {
        self.gesture.cancel();
        match self.panel_tab() {
            Some(PanelTab::History) => {
                if let Some(id) = self.selected_record() { self.remove_record(id); }
            }
            Some(PanelTab::BlockList) => {
                if let Some(index) = self.selected_block() { self.delete_block(index); }
            }
            None => {}
        }
    }

    /// Runs the click handler of the selected history row.
    pub fn activate_selected(&mut self) {
        self.gesture.cancel();
        let handler: Option<ClickHandler> = self
            .panel()
            .filter(|p| p.tab == PanelTab::History)
            .and_then(|p| p.history.as_ref())
            .and_then(|h| h.selected_item())
            .and_then(|i| i.on_click.clone());
        match handler {
            Some(h) => self.status_message = h.call(),
            None => self.status_message = "This toast has no click action".to_string(),
        }
    }

    // Mouse

    pub fn handle_mouse(&mut self, event: MouseEvent, now: Instant) {
        let (x, y) = (event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self.mouse_down(x, y, now),
            MouseEventKind::Down(MouseButton::Right) => {
                if self.state != AppState::Dialog {
                    if let Some(index) = self.hits.live_toast(x, y) { self.toastr.dismiss(index); }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                match self.gesture.release(now) {
                    Some(Gesture::Click(id)) => self.toggle_record(id),
                    Some(Gesture::LongPress(id)) => self.remove_record(id),
                    None => {}
                }
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                let target = self.hits.history_row(x, y);
                self.gesture.moved(target);
            }
            MouseEventKind::ScrollDown => {
                if self.state == AppState::Dialog { self.panel_next(); self.dialog_scroll(1); }
            }
            MouseEventKind::ScrollUp => {
                if self.state == AppState::Dialog { self.panel_previous(); self.dialog_scroll(-1); }
            }
            _ => {}
        }
    }

    fn mouse_down(&mut self, x: u16, y: u16, now: Instant) {
        if self.state == AppState::Dialog {
            if let Some(id) = self.hits.history_row(x, y) {
                self.gesture.press(id, now);
            } else if let Some(index) = self.hits.block_row(x, y) {
                self.delete_block(index);
            }
            return;
        }
        if contains(&self.hits.trigger, x, y) {
            self.open_trigger();
        } else if let Some(index) = self.hits.live_toast(x, y) {
            if let Some(text) = self.toastr.click(index) {
                self.status_message = text;
            }
        }
    }

    pub fn dialog_scroll(&mut self, delta: i32) {
        if let Some(dialog) = self.dialog.as_mut() {
            if delta > 0 { dialog.scroll_down() } else { dialog.scroll_up() }
        }
    }

    /// Timers: expires live toasts and fires a held long-press.
    pub fn tick(&mut self, now: Instant) {
        self.toastr.expire(now);
        if let Some(Gesture::LongPress(id)) = self.gesture.poll(now) {
            self.remove_record(id);
        }
    }

    // Command prompt

    pub fn open_command(&mut self) {
        self.state = AppState::Command;
        self.input_buffer.clear();
        self.input_cursor = 0;
    }

    pub fn cancel_input(&mut self) {
        self.state = AppState::Normal;
        self.input_buffer.clear();
        self.input_cursor = 0;
    }

    pub fn submit_command(&mut self) -> Result<()> {
        let line = std::mem::take(&mut self.input_buffer);
        self.input_cursor = 0;
        self.state = AppState::Normal;
        if line.trim().is_empty() {
            return Ok(());
        }
        let (callback, args) = self.commands.resolve(&line)?;
        log::debug!("running command '{}'", line.trim());
        let out = callback(self, args)?;
        if !out.is_empty() {
            self.status_message = out;
        }
        Ok(())
    }

    pub fn input_char(&mut self, c: char) {
        self.input_buffer.insert(self.input_cursor, c);
        self.input_cursor += c.len_utf8();
    }

    pub fn input_backspace(&mut self) {
        if let Some(c) = self.input_buffer[..self.input_cursor].chars().next_back() {
            self.input_cursor -= c.len_utf8();
            self.input_buffer.remove(self.input_cursor);
        }
    }

    pub fn input_move_left(&mut self) {
        if let Some(c) = self.input_buffer[..self.input_cursor].chars().next_back() {
            self.input_cursor -= c.len_utf8();
        }
    }

    pub fn input_move_right(&mut self) {
        if let Some(c) = self.input_buffer[self.input_cursor..].chars().next() {
            self.input_cursor += c.len_utf8();
        }
    }
}

fn cmd_blocks(app: &mut App, _args: &str) -> Result<String> {
    app.open_block_list()?;
    Ok(String::new())
}

fn cmd_history(app: &mut App, _args: &str) -> Result<String> {
    app.open_history_panel()?;
    Ok(String::new())
}

fn cmd_help(app: &mut App, _args: &str) -> Result<String> {
    let text = app.commands.help_text();
    app.alert("Commands", text);
    Ok(String::new())
}

/// `toast <level> [--click] <message> [| title]`
fn cmd_toast(app: &mut App, args: &str) -> Result<String> {
    let (level, rest) = match args.split_once(char::is_whitespace) {
        Some((level, rest)) => (level, rest.trim()),
        None => (args, ""),
    };
    let level: Level = level.parse()?;
    let (clickable, rest) = match rest.strip_prefix("--click") {
        Some(rest) => (true, rest.trim()),
        None => (false, rest),
    };
    let (message, title) = match rest.split_once('|') {
        Some((message, title)) => (message.trim(), Some(title.trim())),
        None => (rest, None),
    };

    let mut options = ToastOptions::default();
    if clickable {
        let text = message.to_string();
        options.on_click = Some(ClickHandler::new(move || format!("Clicked toast: {}", text)));
    }
    app.emit(level, message, title, options);
    Ok(format!("Sent {} toast", level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::suppression::tests::RecordingSink;
    use crossterm::event::KeyModifiers;
    use std::time::Duration;

    fn app() -> (App, RecordingSink) {
        let sink = RecordingSink::default();
        let app = App::new(Config::default(), Settings::default(), Box::new(sink.clone())).unwrap();
        (app, sink)
    }

    fn run(app: &mut App, line: &str) {
        app.open_command();
        for c in line.chars() {
            app.input_char(c);
        }
        app.submit_command().unwrap();
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE }
    }

    fn history_len(app: &App) -> usize {
        app.overlay.borrow().history.len()
    }

    #[test]
    fn toast_command_reaches_history() {
        let (mut app, _) = app();
        run(&mut app, "/toast error Connection lost | Network");
        run(&mut app, "toast error Connection lost | Network");
        assert_eq!(history_len(&app), 2);
        let overlay = app.overlay.borrow();
        let record = overlay.history.iter().next().unwrap();
        assert_eq!(record.level, Level::Error);
        assert_eq!(record.content, "Connection lost");
        assert_eq!(record.snapshot.title.as_deref(), Some("Network"));
    }

    #[test]
    fn unknown_command_is_an_error() {
        let (mut app, _) = app();
        app.open_command();
        app.input_char('x');
        assert!(app.submit_command().is_err());
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn suppress_from_panel_blocks_future_emissions() {
        let (mut app, sink) = app();
        run(&mut app, "toast error Connection lost");
        run(&mut app, "toast error Connection lost");
        app.open_history_panel().unwrap();

        app.toggle_selected();
        assert_eq!(sink.0.borrow().last().map(|s| s.hide_list.len()), Some(1));
        {
            let panel = app.dialog.as_ref().unwrap().panel().unwrap();
            assert!(panel.history.as_ref().unwrap().items.iter().all(|i| i.suppressed));
            assert_eq!(panel.blocks.rows.len(), 1);
        }

        run(&mut app, "toast error Connection lost");
        assert_eq!(history_len(&app), 2);
    }

    #[test]
    fn clear_needs_affirmative_result() {
        let (mut app, _) = app();
        run(&mut app, "toast info one");
        run(&mut app, "toast warning two");

        app.open_history_panel().unwrap();
        app.close_dialog(DialogResult::Negative);
        assert_eq!(history_len(&app), 2);

        app.open_history_panel().unwrap();
        app.close_dialog(DialogResult::Affirmative);
        assert_eq!(history_len(&app), 0);
        assert_eq!(app.trigger_summary(), "no toasts");
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn block_list_dialog_cannot_clear_history() {
        let (mut app, _) = app();
        run(&mut app, "toast info keep");
        run(&mut app, "toasthistory-blocks");
        assert_eq!(app.state, AppState::Dialog);
        app.close_dialog(DialogResult::Affirmative);
        assert_eq!(history_len(&app), 1);
    }

    #[test]
    fn long_press_removes_and_short_press_toggles() {
        let (mut app, _) = app();
        run(&mut app, "toast info first");
        run(&mut app, "toast info second");
        app.open_history_panel().unwrap();

        let ids: Vec<RecordId> = app.overlay.borrow().history.iter().map(|r| r.id()).collect();
        app.hits.history_rows = vec![(Rect::new(0, 5, 40, 2), ids[1]), (Rect::new(0, 7, 40, 2), ids[0])];
        let t0 = Instant::now();

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 3, 5), t0);
        app.tick(t0 + Duration::from_millis(100));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 3, 5), t0 + Duration::from_millis(150));
        assert_eq!(history_len(&app), 2);
        assert_eq!(app.overlay.borrow().engine.len(), 1);

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 3, 7), t0);
        app.tick(t0 + Config::default().long_press());
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 3, 7), t0 + Config::default().long_press());
        assert_eq!(history_len(&app), 1);
        assert!(app.overlay.borrow().history.get(ids[0]).is_none());
        // the long press did not also toggle
        assert_eq!(app.overlay.borrow().engine.len(), 1);
    }

    #[test]
    fn leaving_the_row_cancels_the_long_press() {
        let (mut app, _) = app();
        run(&mut app, "toast info only");
        app.open_history_panel().unwrap();
        let id = app.overlay.borrow().history.iter().next().unwrap().id();
        app.hits.history_rows = vec![(Rect::new(0, 5, 40, 2), id)];
        let t0 = Instant::now();

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 3, 5), t0);
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 3, 20), t0 + Duration::from_millis(100));
        app.tick(t0 + Duration::from_secs(2));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 3, 20), t0 + Duration::from_secs(2));

        assert_eq!(history_len(&app), 1);
        assert_eq!(app.overlay.borrow().engine.len(), 0);
    }

    fn press_first_row(app: &mut App, t0: Instant) -> RecordId {
        let id = app.dialog.as_ref().unwrap().panel().unwrap().history.as_ref().unwrap().items[0].id;
        app.hits.history_rows = vec![(Rect::new(0, 5, 40, 2), id)];
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 3, 5), t0);
        id
    }

    #[test]
    fn keyboard_toggle_disarms_a_held_long_press() {
        let (mut app, _) = app();
        run(&mut app, "toast error Connection lost");
        app.open_history_panel().unwrap();
        let t0 = Instant::now();
        let id = press_first_row(&mut app, t0);

        app.toggle_selected();
        app.tick(t0 + Duration::from_secs(1));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 3, 5), t0 + Duration::from_secs(1));

        assert!(app.overlay.borrow().history.get(id).is_some());
        assert_eq!(app.overlay.borrow().engine.len(), 1);
    }

    #[test]
    fn filter_change_disarms_a_held_long_press() {
        let (mut app, _) = app();
        run(&mut app, "toast error Connection lost");
        app.open_history_panel().unwrap();
        let t0 = Instant::now();
        let id = press_first_row(&mut app, t0);

        app.set_filter(LevelFilter::Only(Level::Info));
        app.tick(t0 + Duration::from_secs(1));

        assert!(app.overlay.borrow().history.get(id).is_some());
        assert!(!app.gesture.is_pending());
    }

    #[test]
    fn only_alerts_scroll() {
        let (mut app, _) = app();
        run(&mut app, "toast info one");
        app.open_history_panel().unwrap();
        app.dialog_scroll(1);
        assert_eq!(app.dialog.as_ref().unwrap().scroll, 0);

        app.close_dialog(DialogResult::Negative);
        app.alert("Commands", "a\nb\nc".to_string());
        app.dialog_scroll(1);
        app.dialog_scroll(1);
        app.dialog_scroll(-1);
        assert_eq!(app.dialog.as_ref().unwrap().scroll, 1);
    }

    #[test]
    fn deleting_last_record_shows_placeholder_state() {
        let (mut app, _) = app();
        run(&mut app, "toast success done");
        app.open_history_panel().unwrap();
        app.delete_selected();
        let panel = app.dialog.as_ref().unwrap().panel().unwrap();
        assert!(panel.history.as_ref().unwrap().is_empty());
        assert_eq!(history_len(&app), 0);
    }

    #[test]
    fn block_list_delete_unmarks_history() {
        let (mut app, _) = app();
        run(&mut app, "toast warning low disk");
        app.open_history_panel().unwrap();
        app.toggle_selected();
        app.panel_switch_tab();
        app.delete_selected();

        assert_eq!(app.overlay.borrow().engine.len(), 0);
        let panel = app.dialog.as_ref().unwrap().panel().unwrap();
        assert!(panel.history.as_ref().unwrap().items.iter().all(|i| !i.suppressed));
        assert!(panel.blocks.is_empty());
    }

    #[test]
    fn click_handler_runs_from_history() {
        let (mut app, _) = app();
        run(&mut app, "toast info --click open settings");
        app.open_history_panel().unwrap();
        app.activate_selected();
        assert_eq!(app.status_message, "Clicked toast: open settings");
    }

    #[test]
    fn small_terminal_fails_to_open_panel_with_alert() {
        let (mut app, _) = app();
        app.hits.screen = Rect::new(0, 0, 20, 5);
        app.open_trigger();
        let dialog = app.dialog.as_ref().unwrap();
        assert!(!dialog.can_affirm());
        assert!(matches!(dialog.content, crate::modules::dialog::DialogContent::Alert(_)));
    }

    #[test]
    fn disabled_config_skips_interception() {
        let config = Config { enabled: false, ..Config::default() };
        let mut app = App::new(config, Settings::default(), Box::new(RecordingSink::default())).unwrap();
        run(&mut app, "toast error ignored");
        assert_eq!(history_len(&app), 0);
        assert_eq!(app.toastr.live_len(), 1);
    }

    #[test]
    fn report_error_lands_in_history() {
        let (mut app, _) = app();
        app.report_error("Save failed", anyhow::anyhow!("disk full"));
        let overlay = app.overlay.borrow();
        let record = overlay.history.iter().next().unwrap();
        assert_eq!(record.level, Level::Error);
        assert_eq!(record.content, "Save failed: disk full");
    }

    #[test]
    fn right_click_dismisses_live_toast_without_touching_history() {
        let (mut app, _) = app();
        run(&mut app, "toast info --click hello");
        app.hits.live_toasts = vec![(Rect::new(50, 1, 40, 4), 0)];
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Right), 55, 2), Instant::now());
        assert_eq!(app.toastr.live_len(), 0);
        assert_eq!(history_len(&app), 1);
        assert_ne!(app.status_message, "Clicked toast: hello");
    }

    #[test]
    fn command_input_handles_multibyte_chars() {
        let (mut app, _) = app();
        app.open_command();
        app.input_char('é');
        app.input_char('x');
        app.input_move_left();
        app.input_backspace();
        assert_eq!(app.input_buffer, "x");
        assert_eq!(app.input_cursor, 0);
    }
}
