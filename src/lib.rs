//! Finds the lowest-latency VPN relay in a provider's relay list.
//!
//! The relay directory is turned into [`probe::prelude::Candidate`]s, every
//! candidate is probed once under a bounded number of concurrent probes, and
//! the answers are ranked by latency into a [`probe::prelude::RunReport`].

pub mod config;
pub mod error;
pub mod output;
pub mod probe;
pub mod relays;
