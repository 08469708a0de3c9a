//! Result alias and helpers for per-document error handling

use crate::error::RecastError;

pub type Result<T> = std::result::Result<T, RecastError>;

pub trait ResultExt<T> {
    /// `Some` on success; otherwise logs the error and yields `None`
    ///
    /// Recoverable errors are logged at `warn`, anything else at `error`.
    /// Used where one failing document must not stop a batch.
    fn log_and_continue(self) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn log_and_continue(self) -> Option<T> {
        self.inspect_err(|err| {
            if err.is_recoverable() {
                tracing::warn!(kind = ?err.kind(), "skipping: {err}");
            } else {
                tracing::error!(kind = ?err.kind(), "skipping: {err}");
            }
        })
        .ok()
    }
}
