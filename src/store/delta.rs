/// Receiver of row changes in list space.
///
/// Every index is a position in the flattened list (task rows plus the detail rows of the
/// expanded task), valid at the moment the call is made.
pub trait RowSink {
    fn insert_row(&mut self, at: usize);
    fn remove_row(&mut self, at: usize);
    /// Row at `from` now sits at `to`; rows in between shift by one
    fn move_row(&mut self, from: usize, to: usize);
    fn update_row(&mut self, at: usize);
    /// Ascending indices, already valid after the insertion
    fn insert_rows(&mut self, at: &[usize]);
    /// Ascending indices, valid before the removal
    fn remove_rows(&mut self, at: &[usize]);
    fn reload_rows(&mut self, at: &[usize]);

    /// The timer shown in row `at` just stopped
    fn stop_row(&mut self, _at: usize) {}
}

/// One recorded sink call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDelta {
    Insert(usize),
    Remove(usize),
    Move { from: usize, to: usize },
    Update(usize),
    InsertRows(Vec<usize>),
    RemoveRows(Vec<usize>),
    ReloadRows(Vec<usize>),
    Stop(usize),
}

/// Sink that keeps every delta in order
#[derive(Debug, Default)]
pub struct DeltaLog {
    deltas: Vec<RowDelta>,
}

impl DeltaLog {
    pub fn deltas(&self) -> &[RowDelta] {
        &self.deltas
    }

    /// Drain everything recorded so far
    pub fn take(&mut self) -> Vec<RowDelta> {
        std::mem::take(&mut self.deltas)
    }
}

impl RowSink for DeltaLog {
    fn insert_row(&mut self, at: usize) {
        self.deltas.push(RowDelta::Insert(at));
    }

    fn remove_row(&mut self, at: usize) {
        self.deltas.push(RowDelta::Remove(at));
    }

    fn move_row(&mut self, from: usize, to: usize) {
        self.deltas.push(RowDelta::Move { from, to });
    }

    fn update_row(&mut self, at: usize) {
        self.deltas.push(RowDelta::Update(at));
    }

    fn insert_rows(&mut self, at: &[usize]) {
        self.deltas.push(RowDelta::InsertRows(at.to_vec()));
    }

    fn remove_rows(&mut self, at: &[usize]) {
        self.deltas.push(RowDelta::RemoveRows(at.to_vec()));
    }

    fn reload_rows(&mut self, at: &[usize]) {
        self.deltas.push(RowDelta::ReloadRows(at.to_vec()));
    }

    fn stop_row(&mut self, at: usize) {
        self.deltas.push(RowDelta::Stop(at));
    }
}
