use super::{RowSink, StoreError, TaskStore};
use crate::persistence::Persistence;

impl<P: Persistence, S: RowSink> TaskStore<P, S> {
    /// Expand task `t`, or collapse it if it is already expanded.
    /// Any other expanded task is collapsed first.
    pub fn toggle_expansion(&mut self, t: usize) -> Result<(), StoreError> {
        self.check_task(t)?;

        if self.collapse() == Some(t) {
            return Ok(());
        }
        self.expand(t);
        Ok(())
    }

    /// Hide the detail rows. Returns the task that was expanded.
    pub fn collapse(&mut self) -> Option<usize> {
        let e = self.expanded?;
        let rows = self.detail_indices();
        self.expanded = None;
        self.sink.remove_rows(&rows);
        Some(e)
    }

    /// Show the detail rows of `t`; nothing else may be expanded
    pub(crate) fn expand(&mut self, t: usize) {
        debug_assert!(self.expanded.is_none());
        self.expanded = Some(t);
        let rows = self.detail_indices();
        self.sink.insert_rows(&rows);
    }
}
