//! Use cases — the application's orchestration logic.

pub mod continuation;
pub mod coordinator;
pub mod process_turn;
pub(crate) mod shared;

pub use continuation::{ContinuationDriver, ContinuationOutcome, DriveError};
pub use coordinator::ExecutionCoordinator;
pub use process_turn::{TurnOutcome, TurnProcessor};
