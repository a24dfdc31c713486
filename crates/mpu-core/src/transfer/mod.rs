//! Chunked, concurrent upload of one file.
//!
//! The orchestrator decides the part layout, runs part uploads on a bounded
//! pool of tokio tasks, and reports progress through a [`ProgressObserver`].
//! The storage calls themselves go through [`MultipartTarget`].

mod error;
mod plan;
mod progress;
mod run;
mod target;

pub use error::TransferError;
pub use plan::{
    plan_parts, plan_upload, PartLimits, PartRange, TransferSettings, UploadPlan,
    DEFAULT_CONCURRENCY,
};
pub use progress::{NoProgress, ProgressObserver, ProgressPercentage, ProgressStats};
pub use run::{upload_file, UploadReceipt};
pub use target::{CompletedPartInfo, MultipartTarget};
