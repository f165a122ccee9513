use super::TaskStore;

/// What a list-space row shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRef {
    Task(usize),
    /// Time entry `entry` of the expanded task
    Detail { task: usize, entry: usize },
    /// Single row of an expanded task that has no entries
    Placeholder { task: usize },
}

impl RowRef {
    /// Task the row belongs to
    pub fn task(&self) -> usize {
        match *self {
            RowRef::Task(task) | RowRef::Detail { task, .. } | RowRef::Placeholder { task } => task,
        }
    }
}

impl<P, S> TaskStore<P, S> {
    /// Detail rows task `t` shows when expanded (a placeholder counts as one)
    pub fn detail_row_count(&self, t: usize) -> usize {
        self.tasks[t].entries.len().max(1)
    }

    pub fn to_list_index(&self, t: usize) -> usize {
        match self.expanded {
            Some(e) if t > e => t + self.detail_row_count(e),
            _ => t,
        }
    }

    pub fn row_at(&self, list: usize) -> Option<RowRef> {
        let Some(e) = self.expanded else {
            return (list < self.tasks.len()).then_some(RowRef::Task(list));
        };

        if list <= e {
            return Some(RowRef::Task(list));
        }

        let details = self.detail_row_count(e);
        if list <= e + details {
            let n = self.tasks[e].entries.len();
            if n == 0 {
                return Some(RowRef::Placeholder { task: e });
            }
            // Most recent entry first
            return Some(RowRef::Detail {
                task: e,
                entry: n - (list - e),
            });
        }

        let t = list - details;
        (t < self.tasks.len()).then_some(RowRef::Task(t))
    }

    /// Task index of a task row; None for detail rows and out-of-range rows
    pub fn to_task_index(&self, list: usize) -> Option<usize> {
        match self.row_at(list)? {
            RowRef::Task(t) => Some(t),
            _ => None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.tasks.len() + self.expanded.map_or(0, |e| self.detail_row_count(e))
    }

    /// List indices of the expanded task's detail rows
    pub fn detail_indices(&self) -> Vec<usize> {
        match self.expanded {
            Some(e) => {
                let first = self.to_list_index(e) + 1;
                (first..first + self.detail_row_count(e)).collect()
            }
            None => Vec::new(),
        }
    }

    /// Row of entry `entry` of task `t`, if that task is expanded
    pub fn detail_row_index(&self, t: usize, entry: usize) -> Option<usize> {
        if self.expanded != Some(t) {
            return None;
        }
        let n = self.tasks[t].entries.len();
        (entry < n).then(|| self.to_list_index(t) + (n - entry))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identity_when_collapsed() {
        let fx = fixture(&[40, 30, 20]);
        let store = &fx.store;

        for t in 0..3 {
            assert_eq!(store.to_list_index(t), t);
            assert_eq!(store.row_at(t), Some(RowRef::Task(t)));
        }
        assert_eq!(store.row_at(3), None);
        assert_eq!(store.row_count(), 3);
        assert!(store.detail_indices().is_empty());
    }

    #[test]
    fn test_rows_around_expanded_task() {
        let mut fx = fixture_with(vec![vec![50], vec![10, 20, 5], vec![30], vec![]]);
        // Sorted: Task 0 (50), Task 1 (35), Task 2 (30), Task 3 (0)
        assert_eq!(names(&fx.store), vec!["Task 0", "Task 1", "Task 2", "Task 3"]);
        fx.store.toggle_expansion(1).unwrap();
        let store = &fx.store;

        assert_eq!(store.row_count(), 7);
        assert_eq!(store.detail_indices(), vec![2, 3, 4]);
        assert_eq!(store.to_list_index(0), 0);
        assert_eq!(store.to_list_index(1), 1);
        assert_eq!(store.to_list_index(2), 5);
        assert_eq!(store.to_list_index(3), 6);

        assert_eq!(store.row_at(2), Some(RowRef::Detail { task: 1, entry: 2 }));
        assert_eq!(store.row_at(4), Some(RowRef::Detail { task: 1, entry: 0 }));
        assert_eq!(store.row_at(5), Some(RowRef::Task(2)));
        assert_eq!(store.row_at(7), None);
        assert_eq!(store.detail_row_index(1, 2), Some(2));
        assert_eq!(store.detail_row_index(1, 0), Some(4));
        assert_eq!(store.detail_row_index(2, 0), None);
    }

    #[test]
    fn test_placeholder_row() {
        let mut fx = fixture(&[50, 0]);
        fx.store.toggle_expansion(1).unwrap();

        assert_eq!(fx.store.detail_row_count(1), 1);
        assert_eq!(fx.store.row_at(2), Some(RowRef::Placeholder { task: 1 }));
        assert_eq!(fx.store.to_task_index(2), None);
        assert_eq!(fx.store.detail_row_index(1, 0), None);
    }

    #[test]
    fn test_task_rows_round_trip() {
        let mut fx = fixture_with(vec![vec![90], vec![20, 20], vec![30], vec![10]]);

        for expanded in [None, Some(0), Some(1), Some(3)] {
            fx.store.collapse();
            if let Some(e) = expanded {
                fx.store.toggle_expansion(e).unwrap();
            }

            for list in 0..fx.store.row_count() {
                if let Some(t) = fx.store.to_task_index(list) {
                    assert_eq!(fx.store.to_list_index(t), list);
                }
            }
            for t in 0..fx.store.len() {
                assert_eq!(fx.store.to_task_index(fx.store.to_list_index(t)), Some(t));
            }
        }
    }
}
