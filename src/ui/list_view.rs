use crate::store::RowSink;

/// Selection bookkeeping for the task list.
///
/// Applies row deltas so the cursor stays on the same row while rows are inserted,
/// removed and moved underneath it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListView {
    selected: usize,
    rows: usize,
}

impl ListView {
    pub fn new(rows: usize) -> Self {
        Self { selected: 0, rows }
    }

    /// Forget everything and start over with `rows` rows
    pub fn reset(&mut self, rows: usize) {
        self.rows = rows;
        self.clamp();
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn select(&mut self, row: usize) {
        self.selected = row;
        self.clamp();
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows {
            self.selected += 1;
        }
    }

    fn clamp(&mut self) {
        self.selected = self.selected.min(self.rows.saturating_sub(1));
    }
}

impl RowSink for ListView {
    fn insert_row(&mut self, at: usize) {
        if self.rows > 0 && at <= self.selected {
            self.selected += 1;
        }
        self.rows += 1;
    }

    fn remove_row(&mut self, at: usize) {
        if at < self.selected {
            self.selected -= 1;
        }
        self.rows = self.rows.saturating_sub(1);
        self.clamp();
    }

    fn move_row(&mut self, from: usize, to: usize) {
        if self.selected == from {
            self.selected = to;
        } else if from < self.selected && self.selected <= to {
            self.selected -= 1;
        } else if to <= self.selected && self.selected < from {
            self.selected += 1;
        }
    }

    fn update_row(&mut self, _at: usize) {}

    fn insert_rows(&mut self, at: &[usize]) {
        for &row in at {
            self.insert_row(row);
        }
    }

    fn remove_rows(&mut self, at: &[usize]) {
        // A removed selection lands on the row just above the block
        if at.contains(&self.selected) {
            if let Some(&first) = at.first() {
                self.selected = first.saturating_sub(1);
            }
        }
        for &row in at.iter().rev() {
            self.remove_row(row);
        }
    }

    fn reload_rows(&mut self, _at: &[usize]) {}
}
