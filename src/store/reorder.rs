use super::{RowSink, TaskStore};
use crate::domain::compare_elapsed;
use crate::persistence::Persistence;

/// Where a task index ends up after the task at `from` moved to `to`
fn shifted(pos: usize, from: usize, to: usize) -> usize {
    if pos == from {
        to
    } else if to < from && (to..from).contains(&pos) {
        pos + 1
    } else if from < to && (from + 1..=to).contains(&pos) {
        pos - 1
    } else {
        pos
    }
}

impl<P: Persistence, S: RowSink> TaskStore<P, S> {
    /// Move task `i` toward the front while it outranks its predecessor
    pub(crate) fn reorder_up(&mut self, i: usize) -> usize {
        let now = self.now();
        let moved = self.tasks[i].elapsed_at(now);

        let mut new = i;
        while new > 0 && compare_elapsed(moved, self.tasks[new - 1].elapsed_at(now)) {
            new -= 1;
        }

        if new != i {
            self.move_task(i, new);
        }
        new
    }

    /// Move task `i` toward the back while its successor outranks it
    pub(crate) fn reorder_down(&mut self, i: usize) -> usize {
        let now = self.now();
        let moved = self.tasks[i].elapsed_at(now);

        let mut new = i;
        while new + 1 < self.tasks.len() && compare_elapsed(self.tasks[new + 1].elapsed_at(now), moved) {
            new += 1;
        }

        if new != i {
            self.move_task(i, new);
        }
        new
    }

    /// Restore the order around task `i` after its elapsed time changed. Returns its new index.
    pub fn reorder(&mut self, i: usize) -> usize {
        let up = self.reorder_up(i);
        if up != i {
            return up;
        }
        self.reorder_down(i)
    }

    fn move_task(&mut self, from: usize, to: usize) {
        let range = from.min(to)..=from.max(to);

        // Detail rows inside the shifted range would be split apart by a single move
        let reexpand = match self.expanded {
            Some(e) if range.contains(&e) => {
                self.collapse();
                Some(shifted(e, from, to))
            }
            _ => None,
        };

        let list_from = self.to_list_index(from);
        let list_to = self.to_list_index(to);

        if to < from {
            self.tasks[to..=from].rotate_right(1);
        } else {
            self.tasks[from..=to].rotate_left(1);
        }
        self.active = self.active.map(|a| shifted(a, from, to));

        tracing::debug!(task = %self.tasks[to].name, from, to, "reordered task");
        self.sink.move_row(list_from, list_to);

        if let Some(e) = reexpand {
            self.expand(e);
        }
    }
}
