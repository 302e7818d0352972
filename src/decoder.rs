//! The seam between the harness and the system under test.

use std::error::Error as StdError;

use thiserror::Error;

use crate::fragment::Fragment;

/// Boxed cause carried by a [`RejectedFragment`].
pub type RejectReason = Box<dyn StdError + Send + Sync + 'static>;

/// A decoder refused a fragment. The harness skips it and moves on.
#[derive(Debug, Error)]
#[error("fragment rejected: {reason}")]
pub struct RejectedFragment {
    #[source]
    reason: RejectReason,
}

impl RejectedFragment {
    pub fn new(reason: impl Into<RejectReason>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.reason.as_ref()
    }
}

/// A stateful multi-part decoder, fed one fragment at a time.
///
/// Once [`is_complete`](Decoder::is_complete) reports `true` the harness
/// stops submitting. [`reconstructed_payload`](Decoder::reconstructed_payload)
/// only has to return a value when the decoder is complete and successful.
pub trait Decoder {
    fn submit(&mut self, fragment: &Fragment) -> Result<(), RejectedFragment>;

    fn is_complete(&self) -> bool;

    fn is_successful(&self) -> bool;

    fn reconstructed_payload(&self) -> Option<&[u8]>;

    /// A short account of where decoding stands, reported for sessions that
    /// did not succeed.
    fn status_detail(&self) -> Option<String> {
        None
    }
}

impl<D: Decoder + ?Sized> Decoder for &mut D {
    fn submit(&mut self, fragment: &Fragment) -> Result<(), RejectedFragment> {
        (**self).submit(fragment)
    }

    fn is_complete(&self) -> bool {
        (**self).is_complete()
    }

    fn is_successful(&self) -> bool {
        (**self).is_successful()
    }

    fn reconstructed_payload(&self) -> Option<&[u8]> {
        (**self).reconstructed_payload()
    }

    fn status_detail(&self) -> Option<String> {
        (**self).status_detail()
    }
}
