use crate::modules::toastr::Level;

/// Per-level counts behind the trigger badge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelCounters {
    counts: [usize; 4],
}

impl LevelCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, level: Level) {
        self.counts[level.index()] += 1;
    }

    pub fn decrement(&mut self, level: Level) {
        let count = &mut self.counts[level.index()];
        *count = count.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.counts = [0; 4];
    }

    pub fn count(&self, level: Level) -> usize {
        self.counts[level.index()]
    }

    pub fn is_active(&self, level: Level) -> bool {
        self.count(level) > 0
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Tooltip text: "no toasts", or one "N level(s)" line per active level.
    pub fn summary(&self) -> String {
        if self.total() == 0 {
            return "no toasts".to_string();
        }
        let lines: Vec<String> = Level::ALL
            .iter()
            .filter(|l| self.is_active(**l))
            .map(|l| {
                let n = self.count(*l);
                format!("{} {}{}", n, l, if n != 1 { "s" } else { "" })
            })
            .collect();
        lines.join("\n")
    }
}
