pub mod color;
pub mod elapsed;
pub mod entry;
pub mod enums;
pub mod task;

pub use color::Color;
pub use elapsed::{
    compare_elapsed, format_elapsed, format_time, parse_duration_input, parse_start_input,
    DEFAULT_TIME_FORMAT,
};
pub use entry::{EntryId, TimeEntry};
pub use enums::{FormKind, UiMode};
pub use task::{Task, TaskId};
