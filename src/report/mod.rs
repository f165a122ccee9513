pub mod summary;

pub use summary::{render_summary, summary_segments, Segment};
