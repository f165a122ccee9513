//! Fixtures for store tests: a hand-driven clock, failure injection and seeded stores.

use super::{Clock, DeltaLog, TaskStore};
use crate::domain::{EntryId, Task, TaskId, TimeEntry};
use crate::persistence::{JsonStore, Persistence, PersistenceError};
use crate::ticker::tick_duration;
use chrono::{DateTime, Duration, Local, TimeZone};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

pub fn base_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

#[derive(Clone)]
pub struct ManualClock(Rc<Cell<DateTime<Local>>>);

impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self(Rc::new(Cell::new(now)))
    }

    pub fn advance(&self, seconds: i64) {
        self.0.set(self.0.get() + Duration::seconds(seconds));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.0.get()
    }
}

/// Persistence whose mutations fail while the switch is on
pub struct Flaky<P> {
    inner: P,
    fail: Rc<Cell<bool>>,
}

impl<P> Flaky<P> {
    fn check(&self) -> Result<(), PersistenceError> {
        if self.fail.get() {
            Err(PersistenceError::Write {
                path: PathBuf::from("flaky.json"),
                message: "injected failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl<P: Persistence> Persistence for Flaky<P> {
    fn load_all_tasks(&self) -> Result<Vec<Task>, PersistenceError> {
        self.inner.load_all_tasks()
    }

    fn create_task(&mut self, name: &str) -> Result<Task, PersistenceError> {
        self.check()?;
        self.inner.create_task(name)
    }

    fn rename_task(&mut self, task: TaskId, name: &str) -> Result<(), PersistenceError> {
        self.check()?;
        self.inner.rename_task(task, name)
    }

    fn delete_task(&mut self, task: TaskId) -> Result<(), PersistenceError> {
        self.check()?;
        self.inner.delete_task(task)
    }

    fn create_entry(
        &mut self,
        task: TaskId,
        start: DateTime<Local>,
        end: Option<DateTime<Local>>,
    ) -> Result<TimeEntry, PersistenceError> {
        self.check()?;
        self.inner.create_entry(task, start, end)
    }

    fn close_entry(&mut self, entry: EntryId, end: DateTime<Local>) -> Result<(), PersistenceError> {
        self.check()?;
        self.inner.close_entry(entry, end)
    }

    fn delete_entry(&mut self, entry: EntryId) -> Result<(), PersistenceError> {
        self.check()?;
        self.inner.delete_entry(entry)
    }

    fn set_note(&mut self, entry: EntryId, note: Option<&str>) -> Result<(), PersistenceError> {
        self.check()?;
        self.inner.set_note(entry, note)
    }
}

pub type TestStore = TaskStore<Flaky<JsonStore>, DeltaLog>;

pub struct Fixture {
    pub store: TestStore,
    pub clock: ManualClock,
    pub fail: Rc<Cell<bool>>,
}

/// Tasks "Task 0", "Task 1", ... with one closed entry of the given seconds each (none for 0)
pub fn fixture(elapsed: &[i64]) -> Fixture {
    fixture_with(
        elapsed
            .iter()
            .map(|&secs| if secs > 0 { vec![secs] } else { Vec::new() })
            .collect(),
    )
}

/// Like [`fixture`], with explicit entry lengths per task.
///
/// Entries end before `base_time()`, one minute apart, and never overlap within a task.
pub fn fixture_with(entries: Vec<Vec<i64>>) -> Fixture {
    let mut db = JsonStore::in_memory();

    for (i, lengths) in entries.iter().enumerate() {
        let task = db.create_task(&format!("Task {}", i)).unwrap();
        let mut cursor = base_time() - Duration::hours(1);
        for &secs in lengths.iter().rev() {
            let start = cursor - Duration::seconds(secs);
            db.create_entry(task.id, start, Some(cursor)).unwrap();
            cursor = start - Duration::minutes(1);
        }
    }

    let clock = ManualClock::new(base_time());
    let fail = Rc::new(Cell::new(false));
    let persistence = Flaky {
        inner: db,
        fail: Rc::clone(&fail),
    };
    let store = TaskStore::load_with(
        persistence,
        DeltaLog::default(),
        Box::new(clock.clone()),
        tick_duration(),
    )
    .unwrap();

    Fixture { store, clock, fail }
}

pub fn names<P, S>(store: &TaskStore<P, S>) -> Vec<&str> {
    store.tasks().iter().map(|t| t.name.as_str()).collect()
}

pub fn elapsed<P, S>(store: &TaskStore<P, S>) -> Vec<i64> {
    let now = store.now();
    store.tasks().iter().map(|t| t.elapsed_at(now)).collect()
}

/// Structural invariants that must hold after every operation
pub fn assert_invariants<P, S>(store: &TaskStore<P, S>) {
    let mut running = 0;
    for task in store.tasks() {
        assert!(
            task.entries.windows(2).all(|w| w[0].start <= w[1].start),
            "entries of {} out of order",
            task.name
        );
        running += task.entries.iter().filter(|e| e.is_active()).count();
    }

    assert!(running <= 1, "{} running entries", running);
    assert_eq!(running == 1, store.active_index().is_some());
    if let Some(a) = store.active_index() {
        assert!(store.tasks()[a].is_active());
    }
    assert_eq!(store.is_ticking(), store.active_index().is_some());

    if let Some(e) = store.expanded_index() {
        assert!(e < store.len());
    }
    assert_eq!(
        store.row_count(),
        store.len() + store.expanded_index().map_or(0, |e| store.detail_row_count(e))
    );
}
