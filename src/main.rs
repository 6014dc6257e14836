use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::{Builder, Env, Target};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

mod app;
mod config;
mod modules;
mod ui;

use app::{App, AppState};
use config::Config;
use modules::dialog::DialogResult;
use modules::history::LevelFilter;
use modules::settings::{Settings, SettingsStore};
use modules::toastr::Level;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(&config.log_path()?, &config.log_level)?;

    let settings_path = config.settings_file()?;
    let settings = Settings::load(&settings_path);
    let (store, writer) = SettingsStore::spawn(settings_path, config.save_debounce());
    log::debug!("settings writer started for {:?}", store.path());
    let mut app = App::new(config, settings, Box::new(store))?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Dropping the app closes the settings channel so the writer flushes pending changes.
    drop(app);
    if let Err(e) = writer.await {
        log::error!("settings writer stopped abnormally: {}", e);
    }

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn init_logging(path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Opening log file {:?}", path))?;
    Builder::from_env(Env::default().default_filter_or(level))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()?;
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => handle_key(app, key),
                Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
                _ => {}
            }
        }

        app.tick(Instant::now());
        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, KeyEvent { code, modifiers, kind, .. }: KeyEvent) {
    if kind != KeyEventKind::Press {
        return;
    }
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.state {
        AppState::Normal => match code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('?') => app.show_help = !app.show_help,
            KeyCode::Char('h') | KeyCode::Enter => app.open_trigger(),
            KeyCode::Char(':') | KeyCode::Char('/') => app.open_command(),
            KeyCode::Esc => app.show_help = false,
            _ => {}
        },
        AppState::Command => match code {
            KeyCode::Enter => {
                if let Err(e) = app.submit_command() { app.report_error("Command failed", e); }
            }
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => app.input_backspace(),
            KeyCode::Left => app.input_move_left(),
            KeyCode::Right => app.input_move_right(),
            KeyCode::Char(c) => app.input_char(c),
            _ => {}
        },
        AppState::Dialog => match code {
            KeyCode::Esc | KeyCode::Char('q') => app.close_dialog(DialogResult::Negative),
            KeyCode::Char('C') => {
                if app.dialog.as_ref().is_some_and(|d| d.can_affirm()) {
                    app.close_dialog(DialogResult::Affirmative);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => { app.panel_previous(); app.dialog_scroll(-1); }
            KeyCode::Down | KeyCode::Char('j') => { app.panel_next(); app.dialog_scroll(1); }
            KeyCode::Tab | KeyCode::BackTab => app.panel_switch_tab(),
            KeyCode::Char('s') | KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            KeyCode::Enter => app.activate_selected(),
            KeyCode::Char('0') => app.set_filter(LevelFilter::All),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                app.set_filter(LevelFilter::Only(Level::ALL[index]));
            }
            KeyCode::Char('f') => app.cycle_filter(),
            KeyCode::Char('r') => app.refresh_panel(),
            _ => {}
        },
    }
}
