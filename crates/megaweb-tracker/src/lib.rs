/*
[INPUT]:  Public API exports for megaweb-tracker crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod forms;
pub mod poller;
pub mod submitter;
pub mod table;
pub mod tracker;

// Re-export main types for convenience
pub use config::TrackerConfig;
pub use forms::{FieldValues, FormCatalog, FormError, FormSpec};
pub use poller::{PollOutcome, PollPolicy, Poller};
pub use submitter::{SubmitError, Submission};
pub use table::{SharedTable, TaskRow, TaskTable};
pub use tracker::TaskTracker;
