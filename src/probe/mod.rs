pub mod candidate;
pub mod dispatcher;
pub mod error;
pub mod limiter;
pub mod ping_output;
pub mod prober;
pub mod ranker;

pub mod prelude {
    pub use super::candidate::{Candidate, FailureReason, ProbeOutcome};
    pub use super::dispatcher::{Dispatcher, ProgressObserver};
    pub use super::error::DispatchError;
    pub use super::prober::{ConfiguredProber, PingProber, Prober, TcpProber};
    pub use super::ranker::{RankedEntry, RunReport};
}
