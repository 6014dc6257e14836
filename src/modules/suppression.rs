use crate::modules::settings::{HideEntry, Settings, SettingsSink};
use crate::modules::toastr::Level;

/// Identity of "the same" toast for suppression purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub level: Level,
    pub content: String,
}

impl Fingerprint {
    pub fn new(level: Level, content: impl Into<String>) -> Self {
        Self { level, content: content.into() }
    }

    fn matches(&self, entry: &HideEntry) -> bool {
        entry.level == self.level && entry.text_content == self.content
    }
}

impl From<&HideEntry> for Fingerprint {
    fn from(entry: &HideEntry) -> Self {
        Self { level: entry.level, content: entry.text_content.clone() }
    }
}

impl From<Fingerprint> for HideEntry {
    fn from(fp: Fingerprint) -> Self {
        Self { level: fp.level, text_content: fp.content }
    }
}

/// Owns the block-list. Every mutation is handed to the sink; lookups never fail.
pub struct SuppressionEngine {
    settings: Settings,
    sink: Box<dyn SettingsSink>,
}

impl SuppressionEngine {
    pub fn new(settings: Settings, sink: Box<dyn SettingsSink>) -> Self {
        Self { settings, sink }
    }

    pub fn entries(&self) -> &[HideEntry] {
        &self.settings.hide_list
    }

    pub fn len(&self) -> usize {
        self.settings.hide_list.len()
    }

    pub fn is_suppressed(&self, fp: &Fingerprint) -> bool {
        self.settings.hide_list.iter().any(|e| fp.matches(e))
    }

    pub fn suppress(&mut self, fp: &Fingerprint) {
        if self.is_suppressed(fp) { return; }
        log::info!("suppressing {} toast '{}'", fp.level, fp.content);
        self.settings.hide_list.push(fp.clone().into());
        self.persist();
    }

    pub fn unsuppress(&mut self, fp: &Fingerprint) {
        let before = self.settings.hide_list.len();
        self.settings.hide_list.retain(|e| !fp.matches(e));
        if self.settings.hide_list.len() != before {
            log::info!("unsuppressing {} toast '{}'", fp.level, fp.content);
        }
        self.persist();
    }

    /// Flips membership and returns whether the fingerprint is now suppressed.
    pub fn toggle(&mut self, fp: &Fingerprint) -> bool {
        if self.is_suppressed(fp) {
            self.unsuppress(fp);
            false
        } else {
            self.suppress(fp);
            true
        }
    }

    /// Block-list editor deletion. Same list as `unsuppress`, so same effect.
    pub fn delete_permanently(&mut self, fp: &Fingerprint) {
        self.unsuppress(fp);
    }

    fn persist(&self) {
        self.sink.save(&self.settings);
    }
}
