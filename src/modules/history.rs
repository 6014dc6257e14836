use chrono::{DateTime, Local};
use std::collections::VecDeque;

use crate::modules::suppression::{Fingerprint, SuppressionEngine};
use crate::modules::toastr::{ClickHandler, Level, Toast};

pub type RecordId = u64;

/// One observed emission. Never mutated after it enters the buffer.
#[derive(Debug, Clone)]
pub struct NotificationRecord {
    id: RecordId,
    pub level: Level,
    pub content: String,
    pub on_click: Option<ClickHandler>,
    pub snapshot: Toast,
    pub timestamp: DateTime<Local>,
}

impl NotificationRecord {
    /// Content comes from the snapshot; a missing message element counts as empty.
    pub fn new(snapshot: Toast, on_click: Option<ClickHandler>, timestamp: DateTime<Local>) -> Self {
        Self {
            id: 0,
            level: snapshot.level,
            content: snapshot.message.clone().unwrap_or_default(),
            on_click,
            snapshot,
            timestamp,
        }
    }

    #[cfg(test)]
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.level, self.content.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Only(Level),
}

impl LevelFilter {
    pub fn accepts(&self, level: Level) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Only(l) => *l == level,
        }
    }

    pub fn next(self) -> Self {
        match self {
            LevelFilter::All => LevelFilter::Only(Level::ALL[0]),
            LevelFilter::Only(l) => match Level::ALL.get(l.index() + 1) {
                Some(next) => LevelFilter::Only(*next),
                None => LevelFilter::All,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LevelFilter::All => "all",
            LevelFilter::Only(l) => l.as_str(),
        }
    }
}

/// A rendered history row. The snapshot is what gets redisplayed.
#[derive(Debug, Clone)]
pub struct HistoryItemView {
    pub id: RecordId,
    pub level: Level,
    pub content: String,
    pub snapshot: Toast,
    pub timestamp: DateTime<Local>,
    pub on_click: Option<ClickHandler>,
    pub suppressed: bool,
}

impl HistoryItemView {
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.level, self.content.clone())
    }

    pub fn clickable(&self) -> bool {
        self.on_click.is_some()
    }

    /// Snapshot title, or the level name when the toast had none.
    pub fn heading(&self) -> String {
        self.snapshot.title.clone().unwrap_or_else(|| self.level.to_string())
    }

    /// Level read back from the snapshot's `toast-<level>` class.
    pub fn class_level(&self) -> Option<Level> {
        self.snapshot
            .classes
            .iter()
            .find_map(|c| c.strip_prefix("toast-"))
            .and_then(|l| l.parse().ok())
    }
}

pub struct HistoryBuffer {
    records: VecDeque<NotificationRecord>,
    next_id: RecordId,
    limit: Option<usize>,
}

impl HistoryBuffer {
    pub fn new(limit: Option<usize>) -> Self {
        Self { records: VecDeque::new(), next_id: 1, limit: limit.filter(|l| *l > 0) }
    }

    /// Appends and returns the assigned id, plus the record evicted by the limit if any.
    pub fn record(&mut self, mut record: NotificationRecord) -> (RecordId, Option<NotificationRecord>) {
        record.id = self.next_id;
        self.next_id += 1;
        let id = record.id;
        self.records.push_back(record);

        let evicted = match self.limit {
            Some(limit) if self.records.len() > limit => self.records.pop_front(),
            _ => None,
        };
        if let Some(old) = &evicted {
            log::debug!("history limit reached, evicted record {}", old.id);
        }
        (id, evicted)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn remove(&mut self, id: RecordId) -> Option<NotificationRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        self.records.remove(index)
    }

    pub fn get(&self, id: RecordId) -> Option<&NotificationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &NotificationRecord> {
        self.records.iter()
    }

    /// Newest first, suppression flags read from the engine at call time.
    pub fn render(&self, filter: LevelFilter, engine: &SuppressionEngine) -> Vec<HistoryItemView> {
        self.records
            .iter()
            .rev()
            .filter(|r| filter.accepts(r.level))
            .map(|r| HistoryItemView {
                id: r.id,
                level: r.level,
                content: r.content.clone(),
                snapshot: r.snapshot.clone(),
                timestamp: r.timestamp,
                on_click: r.on_click.clone(),
                suppressed: engine.is_suppressed(&r.fingerprint()),
            })
            .collect()
    }
}
