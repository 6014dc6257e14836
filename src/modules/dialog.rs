use crate::modules::panel::Panel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResult {
    Affirmative,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogOptions {
    pub ok_label: Option<String>,
    pub cancel_label: String,
    pub wide: bool,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self { ok_label: None, cancel_label: "Close".to_string(), wide: false }
    }
}

#[derive(Debug)]
pub enum DialogContent {
    Panel(Panel),
    Alert(String),
}

/// A modal popup. The flow that opened it resumes in `App::close_dialog` with the result.
///
/// Panels scroll by following their selection; `scroll` is the line offset of alert text.
#[derive(Debug)]
pub struct Dialog {
    pub title: String,
    pub content: DialogContent,
    pub options: DialogOptions,
    pub scroll: u16,
}

impl Dialog {
    pub fn history(panel: Panel) -> Self {
        Self {
            title: "Toast History".to_string(),
            content: DialogContent::Panel(panel),
            options: DialogOptions {
                ok_label: Some("Clear".to_string()),
                cancel_label: "Close".to_string(),
                wide: true,
            },
            scroll: 0,
        }
    }

    pub fn block_list(panel: Panel) -> Self {
        Self {
            title: "Toast Block List".to_string(),
            content: DialogContent::Panel(panel),
            options: DialogOptions { wide: true, ..Default::default() },
            scroll: 0,
        }
    }

    pub fn alert(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            content: DialogContent::Alert(message.into()),
            options: DialogOptions { cancel_label: "OK".to_string(), ..Default::default() },
            scroll: 0,
        }
    }

    pub fn panel(&self) -> Option<&Panel> {
        match &self.content {
            DialogContent::Panel(p) => Some(p),
            DialogContent::Alert(_) => None,
        }
    }

    pub fn panel_mut(&mut self) -> Option<&mut Panel> {
        match &mut self.content {
            DialogContent::Panel(p) => Some(p),
            DialogContent::Alert(_) => None,
        }
    }

    /// Affirmative is only available when the dialog has an ok button.
    pub fn can_affirm(&self) -> bool {
        self.options.ok_label.is_some()
    }

    pub fn scroll_down(&mut self) {
        if let DialogContent::Alert(text) = &self.content {
            let last_line = text.lines().count().saturating_sub(1);
            self.scroll = (self.scroll.saturating_add(1)).min(last_line as u16);
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn buttons_hint(&self) -> String {
        match &self.options.ok_label {
            Some(ok) => format!("C: {} | Esc: {}", ok, self.options.cancel_label),
            None => format!("Esc: {}", self.options.cancel_label),
        }
    }
}
