//! CLI command handlers, one file per mode.

mod local_etag;
mod remote_etag;
mod upload;

pub use local_etag::run_local_etag;
pub use remote_etag::run_remote_etag;
pub use upload::run_upload;

/// Wall-clock time for console lines, e.g. `14:03:59`.
fn clock() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
