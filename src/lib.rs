//! Decode verification for multi-part UR transfers.
//!
//! Recorded capture files are scanned for `ur:` fragments, replayed through a
//! [`Decoder`] in order, and the reconstructed payloads are checked against
//! golden files.

pub use crate::decoder::{Decoder, RejectedFragment};
pub use crate::errors::{GoldenError, HarnessError};
pub use crate::fragment::Fragment;
pub use crate::runner::{FileReport, SuiteRunner, SuiteSummary};
pub use crate::session::{run_session, run_session_with, Outcome, SessionResult};

pub mod cli;
pub mod config;
pub mod decoder;
pub mod discovery;
pub mod errors;
pub mod fragment;
pub mod golden;
pub mod runner;
pub mod session;
pub mod ur;
