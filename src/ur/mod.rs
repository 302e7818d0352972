//! Uniform Resources: `ur:<type>/<body>` strings and their multi-part form
//! `ur:<type>/<seq>-<len>/<body>`.
//!
//! [`UrDecoder`] is the decoder the harness drives by default. [`UrEncoder`]
//! and [`encode_single`] produce the same strings and exist mostly so tests
//! and fixtures can be generated without a second implementation.

pub mod bytewords;
pub mod crc32;
pub mod fountain;
mod xoshiro;

use thiserror::Error;
use tracing::debug;

use crate::decoder::{Decoder, RejectedFragment};
use crate::fragment::Fragment;

use self::bytewords::{BytewordsError, Style};
use self::fountain::{FountainDecoder, FountainEncoder, FountainError, Part, PartError};

const SCHEME: &str = "ur:";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrError {
    #[error("missing `ur:` scheme")]
    InvalidScheme,
    #[error("invalid UR type `{0}`")]
    InvalidType(String),
    #[error("UR type `{found}` does not match `{expected}` from earlier parts")]
    TypeMismatch { expected: String, found: String },
    #[error("UR path has {0} components, expected 1 or 2 after the type")]
    InvalidPath(usize),
    #[error("invalid sequence component `{0}`")]
    InvalidSequence(String),
    #[error(transparent)]
    Bytewords(#[from] BytewordsError),
    #[error(transparent)]
    Part(#[from] PartError),
    #[error(transparent)]
    Fountain(#[from] FountainError),
    #[error("decoder already holds a complete result")]
    AlreadyComplete,
}

// ============================================================================
// PARSING
// ============================================================================

/// A UR string split into its components. The body is still bytewords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUr {
    pub ur_type: String,
    /// `(seq_num, seq_len)` for multi-part URs.
    pub sequence: Option<(u32, usize)>,
    pub body: String,
}

impl ParsedUr {
    pub fn parse(value: &str) -> Result<Self, UrError> {
        let lowered = value.trim().to_ascii_lowercase();
        let rest = lowered.strip_prefix(SCHEME).ok_or(UrError::InvalidScheme)?;

        let components: Vec<&str> = rest.split('/').collect();
        let Some((ur_type, path)) = components.split_first() else {
            return Err(UrError::InvalidPath(0));
        };
        if !is_valid_type(ur_type) {
            return Err(UrError::InvalidType((*ur_type).to_owned()));
        }

        let (sequence, body) = match path {
            [body] => (None, *body),
            [sequence, body] => (Some(parse_sequence(sequence)?), *body),
            other => return Err(UrError::InvalidPath(other.len())),
        };

        Ok(Self {
            ur_type: (*ur_type).to_owned(),
            sequence,
            body: body.to_owned(),
        })
    }
}

/// Types are lowercase alphanumerics and hyphens, not starting or ending with a hyphen.
pub fn is_valid_type(ur_type: &str) -> bool {
    !ur_type.is_empty()
        && !ur_type.starts_with('-')
        && !ur_type.ends_with('-')
        && ur_type
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

fn parse_sequence(component: &str) -> Result<(u32, usize), UrError> {
    let invalid = || UrError::InvalidSequence(component.to_owned());
    let (seq_num, seq_len) = component.split_once('-').ok_or_else(invalid)?;
    let seq_num: u32 = seq_num.parse().map_err(|_| invalid())?;
    let seq_len: usize = seq_len.parse().map_err(|_| invalid())?;
    if seq_num == 0 || seq_len == 0 {
        return Err(invalid());
    }
    Ok((seq_num, seq_len))
}

// ============================================================================
// DECODER
// ============================================================================

/// Accumulates UR strings until a payload is reconstructed.
///
/// The first accepted string fixes the UR type. Single-part strings complete
/// the decoder immediately; multi-part strings go through the fountain
/// decoder.
#[derive(Debug, Default)]
pub struct UrDecoder {
    ur_type: Option<String>,
    fountain: FountainDecoder,
    single: Option<Vec<u8>>,
}

impl UrDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receive(&mut self, value: &str) -> Result<(), UrError> {
        if self.is_complete() {
            return Err(UrError::AlreadyComplete);
        }

        let ur = ParsedUr::parse(value)?;
        if let Some(expected) = &self.ur_type {
            if *expected != ur.ur_type {
                return Err(UrError::TypeMismatch {
                    expected: expected.clone(),
                    found: ur.ur_type,
                });
            }
        }

        let body = bytewords::decode(&ur.body, Style::Minimal)?;
        match ur.sequence {
            None => {
                debug!(ur_type = %ur.ur_type, len = body.len(), "single-part UR decoded");
                self.single = Some(body);
            }
            Some((path_seq, path_len)) => {
                let part = Part::from_cbor(&body)?;
                if part.seq_num != path_seq || part.seq_len != path_len {
                    return Err(PartError::SequenceMismatch {
                        path_seq,
                        path_len,
                        seq_num: part.seq_num,
                        seq_len: part.seq_len,
                    }
                    .into());
                }
                self.fountain.receive(&part)?;
            }
        }

        self.ur_type.get_or_insert(ur.ur_type);
        Ok(())
    }

    pub fn ur_type(&self) -> Option<&str> {
        self.ur_type.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.single.is_some() || self.fountain.is_complete()
    }

    pub fn is_successful(&self) -> bool {
        self.single.is_some() || self.fountain.is_successful()
    }

    pub fn message(&self) -> Option<&[u8]> {
        self.single.as_deref().or_else(|| self.fountain.message())
    }

    /// Checksum failure of a completed transfer, or progress of an
    /// incomplete multi-part one.
    pub fn status(&self) -> Option<String> {
        if let Some(mismatch) = self.fountain.failure() {
            return Some(mismatch.to_string());
        }
        if self.is_complete() {
            return None;
        }
        self.fountain.expected_part_count().map(|expected| {
            format!(
                "{} of {expected} fragments recovered from {} parts",
                self.fountain.recovered_fragments(),
                self.fountain.received_parts()
            )
        })
    }
}

impl Decoder for UrDecoder {
    fn submit(&mut self, fragment: &Fragment) -> Result<(), RejectedFragment> {
        self.receive(fragment.as_str()).map_err(RejectedFragment::new)
    }

    fn is_complete(&self) -> bool {
        UrDecoder::is_complete(self)
    }

    fn is_successful(&self) -> bool {
        UrDecoder::is_successful(self)
    }

    fn reconstructed_payload(&self) -> Option<&[u8]> {
        self.message()
    }

    fn status_detail(&self) -> Option<String> {
        self.status()
    }
}

// ============================================================================
// ENCODER
// ============================================================================

/// Encodes `payload` as a single-part UR.
pub fn encode_single(payload: &[u8], ur_type: &str) -> Result<String, UrError> {
    if !is_valid_type(ur_type) {
        return Err(UrError::InvalidType(ur_type.to_owned()));
    }
    Ok(format!(
        "{SCHEME}{ur_type}/{}",
        bytewords::encode(payload, Style::Minimal)
    ))
}

/// Produces the stream of UR strings for one payload.
///
/// Payloads that fit in one fragment are always emitted as single-part URs.
#[derive(Debug, Clone)]
pub struct UrEncoder {
    ur_type: String,
    payload: Vec<u8>,
    fountain: FountainEncoder,
}

impl UrEncoder {
    pub fn new(payload: &[u8], max_fragment_len: usize, ur_type: &str) -> Result<Self, UrError> {
        if !is_valid_type(ur_type) {
            return Err(UrError::InvalidType(ur_type.to_owned()));
        }
        Ok(Self {
            ur_type: ur_type.to_owned(),
            payload: payload.to_vec(),
            fountain: FountainEncoder::new(payload, max_fragment_len)?,
        })
    }

    pub fn seq_len(&self) -> usize {
        self.fountain.seq_len()
    }

    pub fn next_part(&mut self) -> Result<String, UrError> {
        if self.fountain.is_single_part() {
            return encode_single(&self.payload, &self.ur_type);
        }
        let part = self.fountain.next_part();
        Ok(format!(
            "{SCHEME}{}/{}-{}/{}",
            self.ur_type,
            part.seq_num,
            part.seq_len,
            bytewords::encode(&part.to_cbor()?, Style::Minimal)
        ))
    }
}
