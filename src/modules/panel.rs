use crate::modules::history::{HistoryItemView, LevelFilter, RecordId};
use crate::modules::overlay::ToastHistory;
use crate::modules::settings::HideEntry;
use crate::modules::suppression::{Fingerprint, SuppressionEngine};

pub const NO_NOTIFICATIONS: &str = "No notifications";
pub const EMPTY_BLOCK_LIST: &str = "Block list is empty";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelTab {
    History,
    BlockList,
}

/// Rendered history rows. Rows are built when the panel opens and then patched in place.
#[derive(Debug)]
pub struct HistoryPanel {
    pub filter: LevelFilter,
    pub items: Vec<HistoryItemView>,
    pub selected: usize,
}

impl HistoryPanel {
    pub fn open(overlay: &ToastHistory, filter: LevelFilter) -> Self {
        Self { filter, items: overlay.render(filter), selected: 0 }
    }

    pub fn refresh(&mut self, overlay: &ToastHistory) {
        self.items = overlay.render(self.filter);
        self.clamp();
    }

    pub fn set_filter(&mut self, filter: LevelFilter, overlay: &ToastHistory) {
        self.filter = filter;
        self.selected = 0;
        self.refresh(overlay);
    }

    /// Updates the suppressed flag of every row sharing the fingerprint.
    pub fn mark(&mut self, fp: &Fingerprint, suppressed: bool) {
        for item in self.items.iter_mut().filter(|i| i.fingerprint() == *fp) {
            item.suppressed = suppressed;
        }
    }

    fn remove_row(&mut self, id: RecordId) {
        self.items.retain(|i| i.id != id);
        self.clamp();
    }

    pub fn selected_item(&self) -> Option<&HistoryItemView> {
        self.items.get(self.selected)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.items.is_empty() {
            self.selected = if self.selected == 0 { self.items.len() - 1 } else { self.selected - 1 };
        }
    }

    fn clamp(&mut self) {
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }
}

#[derive(Debug, Default)]
pub struct BlockListPanel {
    pub rows: Vec<HideEntry>,
    pub selected: usize,
}

impl BlockListPanel {
    pub fn open(engine: &SuppressionEngine) -> Self {
        Self { rows: engine.entries().to_vec(), selected: 0 }
    }

    pub fn rebuild(&mut self, engine: &SuppressionEngine) {
        self.rows = engine.entries().to_vec();
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn select_next(&mut self) {
        if !self.rows.is_empty() {
            self.selected = (self.selected + 1) % self.rows.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.rows.is_empty() {
            self.selected = if self.selected == 0 { self.rows.len() - 1 } else { self.selected - 1 };
        }
    }
}

/// The combined history and block-list panel. Every suppression change made through it
/// updates the engine, the history rows and the block-list rows in one call.
#[derive(Debug)]
pub struct Panel {
    pub tab: PanelTab,
    pub history: Option<HistoryPanel>,
    pub blocks: BlockListPanel,
}

impl Panel {
    pub fn combined(overlay: &ToastHistory) -> Self {
        Self {
            tab: PanelTab::History,
            history: Some(HistoryPanel::open(overlay, LevelFilter::All)),
            blocks: BlockListPanel::open(&overlay.engine),
        }
    }

    pub fn block_list(overlay: &ToastHistory) -> Self {
        Self { tab: PanelTab::BlockList, history: None, blocks: BlockListPanel::open(&overlay.engine) }
    }

    pub fn switch_tab(&mut self) {
        if self.history.is_some() {
            self.tab = match self.tab {
                PanelTab::History => PanelTab::BlockList,
                PanelTab::BlockList => PanelTab::History,
            };
        }
    }

    /// Click on a history row. Returns the new suppression state.
    pub fn toggle_item(&mut self, overlay: &mut ToastHistory, id: RecordId) -> Option<bool> {
        let (fp, suppressed) = overlay.toggle_record(id)?;
        self.apply(overlay, &fp, suppressed);
        Some(suppressed)
    }

    /// Delete action of the block-list editor.
    pub fn delete_block(&mut self, overlay: &mut ToastHistory, index: usize) -> Option<Fingerprint> {
        let fp = Fingerprint::from(self.blocks.rows.get(index)?);
        overlay.unblock(&fp);
        self.apply(overlay, &fp, false);
        Some(fp)
    }

    /// Long-press on a history row.
    pub fn remove_item(&mut self, overlay: &mut ToastHistory, id: RecordId) -> bool {
        let removed = overlay.remove(id).is_some();
        if let Some(history) = self.history.as_mut() {
            history.remove_row(id);
        }
        removed
    }

    pub fn clear(&mut self, overlay: &mut ToastHistory) {
        overlay.clear();
        if let Some(history) = self.history.as_mut() {
            history.refresh(overlay);
        }
    }

    fn apply(&mut self, overlay: &ToastHistory, fp: &Fingerprint, suppressed: bool) {
        if let Some(history) = self.history.as_mut() {
            history.mark(fp, suppressed);
        }
        self.blocks.rebuild(&overlay.engine);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::overlay::tests::{overlay, toast};
    use crate::modules::toastr::Level;
    use chrono::Local;

    fn seeded() -> (ToastHistory, RecordId, RecordId, RecordId) {
        let mut overlay = overlay();
        let a = overlay.admit(toast(Level::Error, "Connection lost"), None, Local::now()).unwrap();
        let b = overlay.admit(toast(Level::Info, "Saved"), None, Local::now()).unwrap();
        let c = overlay.admit(toast(Level::Error, "Connection lost"), None, Local::now()).unwrap();
        (overlay, a, b, c)
    }

    fn suppressed_ids(panel: &Panel) -> Vec<RecordId> {
        let history = panel.history.as_ref().unwrap();
        history.items.iter().filter(|i| i.suppressed).map(|i| i.id).collect()
    }

    #[test]
    fn toggling_marks_every_rendered_row_with_the_fingerprint() {
        let (mut overlay, a, b, c) = seeded();
        let mut panel = Panel::combined(&overlay);

        assert_eq!(panel.toggle_item(&mut overlay, a), Some(true));
        let mut marked = suppressed_ids(&panel);
        marked.sort();
        assert_eq!(marked, vec![a, c]);
        assert!(!panel.history.as_ref().unwrap().items.iter().find(|i| i.id == b).unwrap().suppressed);
        assert_eq!(panel.blocks.rows.len(), 1);
        assert_eq!(panel.blocks.rows[0].text_content, "Connection lost");

        assert_eq!(panel.toggle_item(&mut overlay, c), Some(false));
        assert!(suppressed_ids(&panel).is_empty());
        assert!(panel.blocks.is_empty());
    }

    #[test]
    fn deleting_from_block_list_unmarks_history_rows() {
        let (mut overlay, a, _, _) = seeded();
        let mut panel = Panel::combined(&overlay);
        panel.toggle_item(&mut overlay, a);

        let fp = panel.delete_block(&mut overlay, 0).unwrap();
        assert_eq!(fp, Fingerprint::new(Level::Error, "Connection lost"));
        assert!(!overlay.engine.is_suppressed(&fp));
        assert!(suppressed_ids(&panel).is_empty());
        assert!(panel.blocks.is_empty());
        assert!(panel.delete_block(&mut overlay, 0).is_none());
    }

    #[test]
    fn views_agree_after_toggle_from_either_side() {
        let (mut overlay, _, b, _) = seeded();
        let mut panel = Panel::combined(&overlay);

        assert_eq!(panel.toggle_item(&mut overlay, b), Some(true));
        let history = panel.history.as_ref().unwrap();
        for item in &history.items {
            let blocked = panel.blocks.rows.iter().any(|r| Fingerprint::from(r) == item.fingerprint());
            assert_eq!(item.suppressed, blocked);
        }
    }

    #[test]
    fn removing_last_row_leaves_placeholder_state() {
        let mut overlay = overlay();
        let id = overlay.admit(toast(Level::Success, "only"), None, Local::now()).unwrap();
        let mut panel = Panel::combined(&overlay);

        assert!(panel.remove_item(&mut overlay, id));
        assert!(overlay.history.is_empty());
        assert!(panel.history.as_ref().unwrap().is_empty());
        assert!(!panel.remove_item(&mut overlay, id));
    }

    #[test]
    fn removing_one_of_two_identical_rows_keeps_the_other() {
        let (mut overlay, a, _, c) = seeded();
        let mut panel = Panel::combined(&overlay);
        panel.remove_item(&mut overlay, a);

        assert_eq!(overlay.history.len(), 2);
        let history = panel.history.as_ref().unwrap();
        assert!(history.items.iter().find(|i| i.id == a).is_none());
        assert!(history.items.iter().find(|i| i.id == c).is_some());
    }

    #[test]
    fn clear_empties_history_rows() {
        let (mut overlay, _, _, _) = seeded();
        let mut panel = Panel::combined(&overlay);
        panel.clear(&mut overlay);
        assert!(panel.history.as_ref().unwrap().is_empty());
        assert_eq!(overlay.history.len(), 0);
    }

    #[test]
    fn filter_limits_rows_to_level() {
        let (overlay, _, b, _) = seeded();
        let mut panel = Panel::combined(&overlay);
        let history = panel.history.as_mut().unwrap();
        history.set_filter(LevelFilter::Only(Level::Info), &overlay);
        assert_eq!(history.items.len(), 1);
        assert_eq!(history.items[0].id, b);
    }

    #[test]
    fn block_list_panel_has_no_history_tab() {
        let (overlay, _, _, _) = seeded();
        let mut panel = Panel::block_list(&overlay);
        panel.switch_tab();
        assert_eq!(panel.tab, PanelTab::BlockList);
        assert!(panel.history.is_none());
    }
}
