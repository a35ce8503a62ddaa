//! The sync orchestrator: decides, per read and write, whether to use the
//! network, the local store, or both, and keeps them consistent.

mod connectivity;
mod service;

pub use connectivity::ConnectivityWatch;
pub use service::{AddOutcome, DetailOutcome, ListOutcome, ReplayReport, SyncService};
