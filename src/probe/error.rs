use thiserror::Error;

use super::ranker::RunReport;

/// Run-level failures of the dispatcher.
///
/// Per-candidate problems are never reported here; they end up in
/// [`RunReport::failed`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Bad configuration or input, raised before any probe starts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The runtime could not carry a probe task to completion.
    #[error("scheduling failure: {0}")]
    Scheduling(String),

    /// Every probe failed. The complete report is still available.
    #[error("all {} probes failed", .0.total)]
    AllFailed(Box<RunReport>),
}
