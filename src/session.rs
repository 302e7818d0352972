//! Drives one decoder over one ordered fragment sequence.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::decoder::Decoder;
use crate::fragment::{read_fragments, Fragment};

/// What a decode session observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    /// Fragments present in the input.
    pub available: usize,
    /// Fragments the decoder accepted before completing or running out.
    pub consumed: usize,
    pub completed: bool,
    pub succeeded: bool,
    /// Present exactly when `succeeded` is true.
    pub payload: Option<Vec<u8>>,
    /// Decoder status for a session that did not succeed.
    pub detail: Option<String>,
}

/// Feeds `fragments` to a fresh `D` until it completes or the input runs out.
pub fn run_session<D: Decoder + Default>(fragments: &[Fragment]) -> SessionResult {
    run_session_with(D::default(), fragments)
}

/// Like [`run_session`] but with a caller-supplied decoder.
///
/// Rejected fragments are logged and skipped; they do not count as consumed.
/// No fragment is submitted after the decoder reports completion.
pub fn run_session_with<D: Decoder>(mut decoder: D, fragments: &[Fragment]) -> SessionResult {
    let mut consumed = 0;
    for (position, fragment) in fragments.iter().enumerate() {
        if let Err(err) = decoder.submit(fragment) {
            debug!(position, error = %err, "skipping rejected fragment");
            continue;
        }
        consumed += 1;
        trace!(position, consumed, "fragment accepted");
        if decoder.is_complete() {
            break;
        }
    }

    let completed = decoder.is_complete();
    let payload = if completed && decoder.is_successful() {
        decoder.reconstructed_payload().map(<[u8]>::to_vec)
    } else {
        None
    };
    let detail = if payload.is_none() {
        decoder.status_detail()
    } else {
        None
    };

    SessionResult {
        available: fragments.len(),
        consumed,
        completed,
        succeeded: payload.is_some(),
        payload,
        detail,
    }
}

/// A session result tied to the capture file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub path: PathBuf,
    pub available: usize,
    pub consumed: usize,
    pub completed: bool,
    pub succeeded: bool,
    pub payload: Option<Vec<u8>>,
    pub detail: Option<String>,
}

impl Outcome {
    pub fn new(path: impl Into<PathBuf>, session: SessionResult) -> Self {
        Self {
            path: path.into(),
            available: session.available,
            consumed: session.consumed,
            completed: session.completed,
            succeeded: session.succeeded,
            payload: session.payload,
            detail: session.detail,
        }
    }
}

/// Reads `path` and decodes its fragments with a fresh `D`.
pub fn verify_file<D: Decoder + Default>(path: &Path) -> Outcome {
    let fragments = read_fragments(path);
    Outcome::new(path, run_session::<D>(&fragments))
}
