//! The ordered task collection behind the list.
//!
//! Tasks are kept sorted by descending elapsed time while a timer runs, at most one task
//! shows its time entries as detail rows, and every structural change is reported to a
//! [`RowSink`] in list-space indices.

pub mod delta;
mod entries;
pub mod error;
mod expansion;
pub mod index;
mod lifecycle;
mod reorder;
#[cfg(test)]
pub(crate) mod testing;

pub use delta::{DeltaLog, RowDelta, RowSink};
pub use error::{StoreError, ValidationError};
pub use index::RowRef;

use crate::domain::{Task, TaskId, TimeEntry};
use crate::persistence::Persistence;
use crate::ticker::{tick_duration, Ticker};
use chrono::{DateTime, Local};
use std::cmp::Reverse;
use std::time::{Duration, Instant};

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

pub struct TaskStore<P, S> {
    /// Descending by elapsed, up to the bucketing of `compare_elapsed`
    tasks: Vec<Task>,
    active: Option<usize>,
    expanded: Option<usize>,
    ticker: Ticker,
    tick_interval: Duration,
    persistence: P,
    sink: S,
    clock: Box<dyn Clock>,
}

impl<P: Persistence, S: RowSink> TaskStore<P, S> {
    pub fn load(persistence: P, sink: S) -> Result<Self, StoreError> {
        Self::load_with(persistence, sink, Box::new(SystemClock), tick_duration())
    }

    /// Load every task, sort by descending elapsed and resume a running timer
    pub fn load_with(
        mut persistence: P,
        sink: S,
        clock: Box<dyn Clock>,
        tick_interval: Duration,
    ) -> Result<Self, StoreError> {
        let mut tasks = persistence.load_all_tasks()?;
        let now = clock.now();

        close_stale_entries(&mut persistence, &mut tasks, now)?;
        tasks.sort_by_key(|t| Reverse(t.elapsed_at(now)));

        let active = tasks.iter().position(Task::is_active);
        let mut ticker = Ticker::Idle;
        if active.is_some() {
            ticker.activate(tick_interval, Instant::now());
        }

        tracing::info!(
            tasks = tasks.len(),
            active = ?active.map(|a| &tasks[a].name),
            "loaded tasks"
        );

        Ok(Self {
            tasks,
            active,
            expanded: None,
            ticker,
            tick_interval,
            persistence,
            sink,
            clock,
        })
    }

    /// Fire a tick when one is due. Returns whether it fired.
    pub fn poll_tick(&mut self, now: Instant) -> bool {
        if self.ticker.poll(now) {
            self.tick();
            true
        } else {
            false
        }
    }

    pub(crate) fn check_task(&self, t: usize) -> Result<(), StoreError> {
        if t < self.tasks.len() {
            Ok(())
        } else {
            Err(StoreError::NoSuchTask(t))
        }
    }

    pub(crate) fn check_entry(&self, t: usize, e: usize) -> Result<(), StoreError> {
        self.check_task(t)?;
        if e < self.tasks[t].entries.len() {
            Ok(())
        } else {
            Err(StoreError::NoSuchEntry { task: t, entry: e })
        }
    }
}

impl<P, S> TaskStore<P, S> {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn expanded_index(&self) -> Option<usize> {
        self.expanded
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    /// How long an event loop may block before the next tick is due
    pub fn tick_timeout(&self, now: Instant, idle: Duration) -> Duration {
        self.ticker.timeout(now, idle)
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    pub fn index_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// First task with this name, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.tasks.iter().position(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Seconds logged over every task
    pub fn total_elapsed(&self) -> i64 {
        let now = self.now();
        self.tasks.iter().map(|t| t.elapsed_at(now)).sum()
    }

    /// Entries of every task, ascending by start
    pub fn all_entries(&self) -> Vec<&TimeEntry> {
        let mut entries: Vec<&TimeEntry> = self.tasks.iter().flat_map(|t| &t.entries).collect();
        entries.sort_by_key(|e| e.start);
        entries
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }
}

/// Keep at most one running entry: the latest-started one, if it is the last of its task
fn close_stale_entries<P: Persistence>(
    persistence: &mut P,
    tasks: &mut [Task],
    now: DateTime<Local>,
) -> Result<(), StoreError> {
    let mut open: Vec<(usize, usize)> = Vec::new();
    for (t, task) in tasks.iter().enumerate() {
        for (e, entry) in task.entries.iter().enumerate() {
            if entry.is_active() {
                open.push((t, e));
            }
        }
    }

    open.sort_by_key(|&(t, e)| Reverse(tasks[t].entries[e].start));

    let keep = open
        .first()
        .copied()
        .filter(|&(t, e)| e + 1 == tasks[t].entries.len());

    for (t, e) in open {
        if Some((t, e)) == keep {
            continue;
        }
        // Never run past the task's next entry
        let end = tasks[t].entries.get(e + 1).map_or(now, |next| next.start);
        let entry = &mut tasks[t].entries[e];
        persistence.close_entry(entry.id, end)?;
        entry.end = Some(end);
        tracing::warn!(task = %tasks[t].name, entry = %tasks[t].entries[e].id, "closed stale running entry");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::persistence::JsonStore;
    use chrono::Duration as ChronoDuration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_sorts_by_descending_elapsed() {
        let fx = fixture(&[30, 500, 0, 500, 90]);

        assert_eq!(
            names(&fx.store),
            vec!["Task 1", "Task 3", "Task 4", "Task 0", "Task 2"]
        );
        assert_eq!(fx.store.active_index(), None);
        assert!(!fx.store.is_ticking());
        assert_invariants(&fx.store);
    }

    #[test]
    fn test_load_resumes_running_task() {
        let clock = ManualClock::new(base_time());
        let mut db = JsonStore::in_memory();
        let idle = db.create_task("Idle").unwrap();
        let running = db.create_task("Running").unwrap();
        db.create_entry(idle.id, base_time() - ChronoDuration::hours(2), Some(base_time() - ChronoDuration::hours(1)))
            .unwrap();
        db.create_entry(running.id, base_time() - ChronoDuration::minutes(5), None)
            .unwrap();

        let store =
            TaskStore::load_with(db, DeltaLog::default(), Box::new(clock), tick_duration()).unwrap();

        assert_eq!(store.active_index(), Some(1));
        assert_eq!(store.tasks()[1].name, "Running");
        assert!(store.is_ticking());
        assert_invariants(&store);
    }

    #[test]
    fn test_load_keeps_only_latest_running_entry() {
        let clock = ManualClock::new(base_time());
        let mut db = JsonStore::in_memory();
        let older = db.create_task("Older").unwrap();
        let newer = db.create_task("Newer").unwrap();
        db.create_entry(older.id, base_time() - ChronoDuration::hours(3), None)
            .unwrap();
        db.create_entry(newer.id, base_time() - ChronoDuration::minutes(10), None)
            .unwrap();

        let store =
            TaskStore::load_with(db, DeltaLog::default(), Box::new(clock), tick_duration()).unwrap();

        let active = store.active_index().unwrap();
        assert_eq!(store.tasks()[active].name, "Newer");
        let older = store.index_of(older.id).unwrap();
        assert_eq!(store.tasks()[older].entries[0].end, Some(base_time()));
        assert_invariants(&store);

        let stored = store.persistence().load_all_tasks().unwrap();
        let open = stored
            .iter()
            .flat_map(|t| &t.entries)
            .filter(|e| e.is_active())
            .count();
        assert_eq!(open, 1);
    }

    #[test]
    fn test_load_closes_buried_running_entry_at_next_start() {
        let clock = ManualClock::new(base_time());
        let mut db = JsonStore::in_memory();
        let task = db.create_task("Review").unwrap();
        db.create_entry(task.id, base_time() - ChronoDuration::hours(3), None)
            .unwrap();
        db.create_entry(
            task.id,
            base_time() - ChronoDuration::hours(2),
            Some(base_time() - ChronoDuration::hours(1)),
        )
        .unwrap();

        let store =
            TaskStore::load_with(db, DeltaLog::default(), Box::new(clock), tick_duration()).unwrap();

        assert_eq!(store.active_index(), None);
        let entries = &store.tasks()[0].entries;
        assert_eq!(entries[0].end, Some(base_time() - ChronoDuration::hours(2)));
        assert!(!entries[0].intersects(entries[1].start, entries[1].end));
        assert_eq!(store.tasks()[0].elapsed_at(base_time()), 2 * 3600);
        assert_invariants(&store);

        let stored = store.persistence().load_all_tasks().unwrap();
        assert_eq!(
            stored[0].entries[0].end,
            Some(base_time() - ChronoDuration::hours(2))
        );
    }

    #[test]
    fn test_summary_accessors() {
        let fx = fixture(&[120, 0, 60]);

        assert_eq!(fx.store.total_elapsed(), 180);
        let starts: Vec<_> = fx.store.all_entries().iter().map(|e| e.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(starts.len(), 2);
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let fx = fixture(&[10, 20]);
        assert_eq!(fx.store.find_by_name(" task 0 "), Some(1));
        assert_eq!(fx.store.find_by_name("nope"), None);
    }

    #[test]
    fn test_poll_tick_only_while_running() {
        let mut fx = fixture(&[100, 50]);
        let now = Instant::now();
        assert!(!fx.store.poll_tick(now + Duration::from_secs(1)));

        fx.store.start(1).unwrap();
        fx.store.sink_mut().take();
        assert!(fx.store.poll_tick(Instant::now() + Duration::from_secs(1)));
        assert_eq!(fx.store.sink_mut().take(), vec![RowDelta::Update(1)]);
    }
}
