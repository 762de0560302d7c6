//! Data persistence and file operations

pub mod executions;
pub mod ledger;
pub mod opportunities;

pub use executions::*;
pub use ledger::*;
pub use opportunities::*;
