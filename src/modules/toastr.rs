use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Info, Level::Success, Level::Warning, Level::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Level::Info => 0,
            Level::Success => 1,
            Level::Warning => 2,
            Level::Error => 3,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Level::Info),
            "success" => Ok(Level::Success),
            "warning" | "warn" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            other => bail!("Unknown toast level '{}'", other),
        }
    }
}

/// Opaque click callback attached to a toast. The returned text is shown to the user.
#[derive(Clone)]
pub struct ClickHandler(Rc<dyn Fn() -> String>);

impl ClickHandler {
    pub fn new(f: impl Fn() -> String + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) -> String {
        (self.0)()
    }
}

impl PartialEq for ClickHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ClickHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClickHandler({:p})", Rc::as_ptr(&self.0))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToastOptions {
    pub on_click: Option<ClickHandler>,
    pub time_out: Option<Duration>,
    pub escape_html: bool,
}

/// A rendered toast element.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub level: Level,
    pub title: Option<String>,
    /// Body of the message element; `None` when the toast was rendered without one.
    pub message: Option<String>,
    pub classes: Vec<String>,
    pub shown_at: Instant,
    pub time_out: Duration,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.time_out
    }
}

pub type ToastHandle = Rc<RefCell<Toast>>;

/// What a hook gets to see about one emission.
pub struct Emission<'a> {
    pub level: Level,
    pub message: &'a str,
    pub title: Option<&'a str>,
    pub options: &'a ToastOptions,
    pub toast: &'a ToastHandle,
}

pub trait ToastHook {
    fn name(&self) -> &str;
    fn on_emit(&self, emission: &Emission<'_>);
}

struct LiveToast {
    handle: ToastHandle,
    on_click: Option<ClickHandler>,
}

pub struct Toastr {
    hooks: Vec<Rc<dyn ToastHook>>,
    live: Vec<LiveToast>,
    default_time_out: Duration,
    max_live: usize,
}

impl Toastr {
    pub fn new(default_time_out: Duration, max_live: usize) -> Self {
        Self { hooks: Vec::new(), live: Vec::new(), default_time_out, max_live: max_live.max(1) }
    }

    pub fn register_hook(&mut self, hook: Rc<dyn ToastHook>) -> Result<()> {
        if self.is_hooked(hook.name()) {
            bail!("Hook '{}' is already registered", hook.name());
        }
        log::debug!("registered toast hook '{}'", hook.name());
        self.hooks.push(hook);
        Ok(())
    }

    pub fn is_hooked(&self, name: &str) -> bool {
        self.hooks.iter().any(|h| h.name() == name)
    }

    pub fn info(&mut self, message: &str, title: Option<&str>, options: ToastOptions) -> ToastHandle {
        self.notify(Level::Info, message, title, options)
    }

    pub fn success(&mut self, message: &str, title: Option<&str>, options: ToastOptions) -> ToastHandle {
        self.notify(Level::Success, message, title, options)
    }

    pub fn warning(&mut self, message: &str, title: Option<&str>, options: ToastOptions) -> ToastHandle {
        self.notify(Level::Warning, message, title, options)
    }

    pub fn error(&mut self, message: &str, title: Option<&str>, options: ToastOptions) -> ToastHandle {
        self.notify(Level::Error, message, title, options)
    }

    pub fn notify(
        &mut self,
        level: Level,
        message: &str,
        title: Option<&str>,
        options: ToastOptions,
    ) -> ToastHandle {
        let toast = Rc::new(RefCell::new(self.render(level, message, title, &options)));

        self.live.push(LiveToast { handle: toast.clone(), on_click: options.on_click.clone() });
        if self.live.len() > self.max_live {
            self.live.remove(0);
        }

        let emission = Emission { level, message, title, options: &options, toast: &toast };
        for hook in &self.hooks {
            hook.on_emit(&emission);
        }
        toast
    }

    fn render(&self, level: Level, message: &str, title: Option<&str>, options: &ToastOptions) -> Toast {
        let message = if message.is_empty() {
            None
        } else if options.escape_html {
            Some(escape_html(message))
        } else {
            Some(message.to_string())
        };
        let title = title.filter(|t| !t.is_empty()).map(|t| {
            if options.escape_html { escape_html(t) } else { t.to_string() }
        });
        Toast {
            level,
            title,
            message,
            classes: vec!["toast".to_string(), format!("toast-{}", level)],
            shown_at: Instant::now(),
            time_out: options.time_out.unwrap_or(self.default_time_out),
        }
    }

    pub fn live(&self) -> impl Iterator<Item = &ToastHandle> {
        self.live.iter().map(|t| &t.handle)
    }

    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    pub fn expire(&mut self, now: Instant) {
        self.live.retain(|t| !t.handle.borrow().is_expired(now));
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.live.len() {
            self.live.remove(index);
        }
    }

    /// Clicks a live toast: runs its handler (if any) and dismisses it.
    pub fn click(&mut self, index: usize) -> Option<String> {
        if index >= self.live.len() {
            return None;
        }
        let toast = self.live.remove(index);
        toast.on_click.map(|h| h.call())
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
