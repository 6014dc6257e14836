use chrono::{DateTime, Local};

use crate::modules::history::{HistoryBuffer, HistoryItemView, LevelFilter, NotificationRecord, RecordId};
use crate::modules::notifications::LevelCounters;
use crate::modules::suppression::{Fingerprint, SuppressionEngine};
use crate::modules::toastr::{ClickHandler, Toast};

/// The overlay core: block-list, history buffer, and the badge counters.
pub struct ToastHistory {
    pub engine: SuppressionEngine,
    pub history: HistoryBuffer,
    pub counters: LevelCounters,
}

impl ToastHistory {
    pub fn new(engine: SuppressionEngine, history: HistoryBuffer) -> Self {
        Self { engine, history, counters: LevelCounters::new() }
    }

    /// Records the snapshot unless its fingerprint is on the block-list.
    pub fn admit(
        &mut self,
        snapshot: Toast,
        on_click: Option<ClickHandler>,
        timestamp: DateTime<Local>,
    ) -> Option<RecordId> {
        let record = NotificationRecord::new(snapshot, on_click, timestamp);
        if self.engine.is_suppressed(&record.fingerprint()) {
            log::debug!("dropped suppressed {} toast '{}'", record.level, record.content);
            return None;
        }
        let level = record.level;
        let (id, evicted) = self.history.record(record);
        self.counters.increment(level);
        if let Some(old) = evicted {
            self.counters.decrement(old.level);
        }
        Some(id)
    }

    pub fn render(&self, filter: LevelFilter) -> Vec<HistoryItemView> {
        self.history.render(filter, &self.engine)
    }

    /// Toggles suppression for the record's fingerprint.
    pub fn toggle_record(&mut self, id: RecordId) -> Option<(Fingerprint, bool)> {
        let fp = self.history.get(id)?.fingerprint();
        let suppressed = self.engine.toggle(&fp);
        Some((fp, suppressed))
    }

    pub fn unblock(&mut self, fp: &Fingerprint) {
        self.engine.delete_permanently(fp);
    }

    pub fn remove(&mut self, id: RecordId) -> Option<NotificationRecord> {
        let removed = self.history.remove(id)?;
        self.counters.decrement(removed.level);
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.counters.reset();
        log::info!("history cleared");
    }
}
