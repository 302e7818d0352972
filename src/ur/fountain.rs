//! Fountain coding of messages too large for a single UR.
//!
//! The message is split into `seq_len` equal fragments. Parts `1..=seq_len`
//! carry one fragment each; later parts carry the XOR of a pseudo-random
//! subset, chosen deterministically from the sequence number and message
//! checksum. A decoder peels mixed parts against what it already knows until
//! every fragment is recovered.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use ciborium::Value;
use thiserror::Error;
use tracing::{debug, trace};

use super::crc32;
use super::xoshiro::Xoshiro256;

/// Smallest fragment an encoder will choose when splitting a message.
pub const MIN_FRAGMENT_LEN: usize = 10;

/// Largest fragment count a decoder accepts for one transfer.
pub const MAX_SEQUENCE_LEN: usize = 1 << 16;

/// Mixed parts a decoder holds at once. Further mixed parts are dropped.
pub const MAX_MIXED_PARTS: usize = 256;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartError {
    #[error("malformed part header: {0}")]
    Cbor(String),
    #[error("part header must be a 5-element array")]
    Shape,
    #[error("part header field `{0}` is missing or out of range")]
    Field(&'static str),
    #[error("part header field `{0}` must be non-zero")]
    Zero(&'static str),
    #[error("part {path_seq}-{path_len} in the UR path disagrees with header {seq_num}-{seq_len}")]
    SequenceMismatch {
        path_seq: u32,
        path_len: usize,
        seq_num: u32,
        seq_len: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FountainError {
    #[error("part does not belong to the transfer in progress ({0})")]
    Inconsistent(&'static str),
    #[error("part carries no data")]
    EmptyPart,
    #[error(
        "header claims {seq_len} fragments, but a {message_len}-byte message \
         in {fragment_len}-byte fragments needs {needed}"
    )]
    SequenceLength {
        seq_len: usize,
        message_len: usize,
        fragment_len: usize,
        needed: usize,
    },
    #[error("transfer of {seq_len} fragments exceeds the limit of {max}")]
    TooManyFragments { seq_len: usize, max: usize },
    #[error("cannot encode an empty message")]
    EmptyMessage,
    #[error("no fragment length between {min} and {max} fits a {message_len}-byte message")]
    FragmentLength {
        message_len: usize,
        min: usize,
        max: usize,
    },
}

// ============================================================================
// PARTS
// ============================================================================

/// One encoded part as carried in a multi-part UR body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub seq_num: u32,
    pub seq_len: usize,
    pub message_len: usize,
    pub checksum: u32,
    pub data: Vec<u8>,
}

impl Part {
    /// Parses the CBOR header `[seqNum, seqLen, messageLen, checksum, data]`.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, PartError> {
        let value: Value =
            ciborium::from_reader(bytes).map_err(|e| PartError::Cbor(e.to_string()))?;
        let Value::Array(items) = value else {
            return Err(PartError::Shape);
        };
        let [seq_num, seq_len, message_len, checksum, data] = items.as_slice() else {
            return Err(PartError::Shape);
        };

        let part = Self {
            seq_num: uint_field(seq_num, "seqNum")?,
            seq_len: uint_field(seq_len, "seqLen")? as usize,
            message_len: uint_field(message_len, "messageLen")? as usize,
            checksum: uint_field(checksum, "checksum")?,
            data: match data {
                Value::Bytes(bytes) => bytes.clone(),
                _ => return Err(PartError::Field("data")),
            },
        };

        if part.seq_num == 0 {
            return Err(PartError::Zero("seqNum"));
        }
        if part.seq_len == 0 {
            return Err(PartError::Zero("seqLen"));
        }
        if part.message_len == 0 {
            return Err(PartError::Zero("messageLen"));
        }
        if part.data.is_empty() {
            return Err(PartError::Zero("data"));
        }
        Ok(part)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, PartError> {
        let value = Value::Array(vec![
            Value::Integer(self.seq_num.into()),
            Value::Integer((self.seq_len as u64).into()),
            Value::Integer((self.message_len as u64).into()),
            Value::Integer(self.checksum.into()),
            Value::Bytes(self.data.clone()),
        ]);
        let mut encoded = Vec::new();
        ciborium::into_writer(&value, &mut encoded).map_err(|e| PartError::Cbor(e.to_string()))?;
        Ok(encoded)
    }

    /// Fragment indexes mixed into this part.
    pub fn indexes(&self) -> BTreeSet<usize> {
        choose_fragments(self.seq_num, self.seq_len, self.checksum)
            .into_iter()
            .collect()
    }
}

fn uint_field(value: &Value, name: &'static str) -> Result<u32, PartError> {
    match value {
        Value::Integer(int) => u32::try_from(*int).map_err(|_| PartError::Field(name)),
        _ => Err(PartError::Field(name)),
    }
}

/// Returns the fragment indexes mixed into part `seq_num`.
///
/// The first `seq_len` parts are simple; later ones are seeded from
/// `seq_num` and `checksum` so that encoder and decoder agree.
pub fn choose_fragments(seq_num: u32, seq_len: usize, checksum: u32) -> Vec<usize> {
    if seq_num as usize <= seq_len {
        return vec![(seq_num as usize).saturating_sub(1)];
    }

    let mut seed = [0u8; 8];
    seed[..4].copy_from_slice(&seq_num.to_be_bytes());
    seed[4..].copy_from_slice(&checksum.to_be_bytes());
    let mut rng = Xoshiro256::from_seed_bytes(&seed);

    let degree = rng.choose_degree(seq_len);
    rng.sample_indexes(seq_len, degree)
}

/// Smallest fragment length that splits `message_len` into pieces no larger
/// than `max_len`, using as few fragments as possible.
pub fn nominal_fragment_len(message_len: usize, min_len: usize, max_len: usize) -> Option<usize> {
    let max_count = (message_len / min_len.max(1)).max(1);
    (1..=max_count)
        .map(|count| message_len.div_ceil(count))
        .find(|&len| len <= max_len)
}

fn xor_into(target: &mut [u8], source: &[u8]) {
    for (t, s) in target.iter_mut().zip(source) {
        *t ^= s;
    }
}

// ============================================================================
// ENCODER
// ============================================================================

/// Emits an unbounded sequence of parts for one message.
#[derive(Debug, Clone)]
pub struct FountainEncoder {
    fragments: Vec<Vec<u8>>,
    message_len: usize,
    checksum: u32,
    seq_num: u32,
}

impl FountainEncoder {
    pub fn new(message: &[u8], max_fragment_len: usize) -> Result<Self, FountainError> {
        if message.is_empty() {
            return Err(FountainError::EmptyMessage);
        }
        let fragment_len = nominal_fragment_len(message.len(), MIN_FRAGMENT_LEN, max_fragment_len)
            .ok_or(FountainError::FragmentLength {
                message_len: message.len(),
                min: MIN_FRAGMENT_LEN,
                max: max_fragment_len,
            })?;

        let fragments = message
            .chunks(fragment_len)
            .map(|chunk| {
                let mut fragment = chunk.to_vec();
                fragment.resize(fragment_len, 0);
                fragment
            })
            .collect();

        Ok(Self {
            fragments,
            message_len: message.len(),
            checksum: crc32::checksum(message),
            seq_num: 0,
        })
    }

    pub fn seq_len(&self) -> usize {
        self.fragments.len()
    }

    /// Sequence number of the most recently emitted part.
    pub fn seq_num(&self) -> u32 {
        self.seq_num
    }

    pub fn is_single_part(&self) -> bool {
        self.fragments.len() == 1
    }

    pub fn next_part(&mut self) -> Part {
        self.seq_num = self.seq_num.saturating_add(1);
        let indexes = choose_fragments(self.seq_num, self.seq_len(), self.checksum);
        let mut data = vec![0u8; self.fragments.first().map_or(0, Vec::len)];
        for index in indexes {
            xor_into(&mut data, &self.fragments[index]);
        }
        Part {
            seq_num: self.seq_num,
            seq_len: self.seq_len(),
            message_len: self.message_len,
            checksum: self.checksum,
            data,
        }
    }
}

// ============================================================================
// DECODER
// ============================================================================

/// Transfer parameters fixed by the first accepted part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Expected {
    seq_len: usize,
    message_len: usize,
    checksum: u32,
    fragment_len: usize,
}

#[derive(Debug, Clone)]
struct IndexedPart {
    indexes: BTreeSet<usize>,
    data: Vec<u8>,
}

impl IndexedPart {
    fn is_simple(&self) -> bool {
        self.indexes.len() == 1
    }

    /// Removes `other` from this part when it covers a strict subset of our indexes.
    fn reduce(&mut self, indexes: &BTreeSet<usize>, data: &[u8]) {
        if indexes.len() < self.indexes.len() && indexes.is_subset(&self.indexes) {
            self.indexes = self.indexes.difference(indexes).copied().collect();
            xor_into(&mut self.data, data);
        }
    }

    fn reduce_simple(&mut self, index: usize, data: &[u8]) {
        if self.indexes.len() > 1 && self.indexes.remove(&index) {
            xor_into(&mut self.data, data);
        }
    }
}

/// The message could be reassembled but its checksum is wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("reassembled message checksum {actual:08x} does not match {expected:08x}")]
pub struct ChecksumMismatch {
    pub expected: u32,
    pub actual: u32,
}

/// Reassembles a message from parts arriving in any order.
#[derive(Debug, Default)]
pub struct FountainDecoder {
    expected: Option<Expected>,
    simple: BTreeMap<usize, Vec<u8>>,
    // insertion order matters: reductions are applied in arrival order
    mixed: Vec<IndexedPart>,
    queue: VecDeque<IndexedPart>,
    result: Option<Result<Vec<u8>, ChecksumMismatch>>,
    received: usize,
}

impl FountainDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one part. Parts that disagree with the transfer in progress
    /// are refused and leave the decoder untouched.
    pub fn receive(&mut self, part: &Part) -> Result<(), FountainError> {
        let expected = self.validate(part)?;
        if self.is_complete() {
            return Ok(());
        }

        self.queue.push_back(IndexedPart {
            indexes: part.indexes(),
            data: part.data.clone(),
        });
        while !self.is_complete() {
            let Some(next) = self.queue.pop_front() else {
                break;
            };
            if next.is_simple() {
                self.process_simple(next, expected);
            } else {
                self.process_mixed(next);
            }
        }

        self.received += 1;
        trace!(
            seq_num = part.seq_num,
            known = self.simple.len(),
            mixed = self.mixed.len(),
            "fountain part processed"
        );
        Ok(())
    }

    fn validate(&mut self, part: &Part) -> Result<Expected, FountainError> {
        if part.data.is_empty() {
            return Err(FountainError::EmptyPart);
        }
        let needed = part.message_len.div_ceil(part.data.len());
        if part.seq_len != needed {
            return Err(FountainError::SequenceLength {
                seq_len: part.seq_len,
                message_len: part.message_len,
                fragment_len: part.data.len(),
                needed,
            });
        }
        if part.seq_len > MAX_SEQUENCE_LEN {
            return Err(FountainError::TooManyFragments {
                seq_len: part.seq_len,
                max: MAX_SEQUENCE_LEN,
            });
        }

        let incoming = Expected {
            seq_len: part.seq_len,
            message_len: part.message_len,
            checksum: part.checksum,
            fragment_len: part.data.len(),
        };
        let Some(expected) = self.expected else {
            self.expected = Some(incoming);
            return Ok(incoming);
        };

        if incoming.seq_len != expected.seq_len {
            return Err(FountainError::Inconsistent("sequence length"));
        }
        if incoming.message_len != expected.message_len {
            return Err(FountainError::Inconsistent("message length"));
        }
        if incoming.checksum != expected.checksum {
            return Err(FountainError::Inconsistent("checksum"));
        }
        if incoming.fragment_len != expected.fragment_len {
            return Err(FountainError::Inconsistent("fragment length"));
        }
        Ok(expected)
    }

    fn process_simple(&mut self, part: IndexedPart, expected: Expected) {
        let Some(&index) = part.indexes.iter().next() else {
            return;
        };
        if self.simple.contains_key(&index) {
            return;
        }
        self.simple.insert(index, part.data.clone());

        if self.simple.len() == expected.seq_len {
            self.finish(expected);
        } else {
            self.reduce_mixed_by(&part);
        }
    }

    fn process_mixed(&mut self, mut part: IndexedPart) {
        if self.mixed.iter().any(|known| known.indexes == part.indexes) {
            return;
        }
        for (&index, data) in &self.simple {
            part.reduce_simple(index, data);
        }
        for known in &self.mixed {
            part.reduce(&known.indexes, &known.data);
        }

        if part.is_simple() {
            self.queue.push_back(part);
        } else {
            self.reduce_mixed_by(&part);
            if self.mixed.len() < MAX_MIXED_PARTS {
                upsert(&mut self.mixed, part);
            } else {
                trace!(limit = MAX_MIXED_PARTS, "mixed part store full, dropping part");
            }
        }
    }

    fn reduce_mixed_by(&mut self, by: &IndexedPart) {
        let mut remaining = Vec::with_capacity(self.mixed.len());
        for mut known in std::mem::take(&mut self.mixed) {
            known.reduce(&by.indexes, &by.data);
            if known.is_simple() {
                self.queue.push_back(known);
            } else {
                upsert(&mut remaining, known);
            }
        }
        self.mixed = remaining;
    }

    fn finish(&mut self, expected: Expected) {
        let mut message: Vec<u8> = self.simple.values().flatten().copied().collect();
        message.truncate(expected.message_len);
        let actual = crc32::checksum(&message);

        self.result = Some(if actual == expected.checksum {
            debug!(len = message.len(), "fountain message reassembled");
            Ok(message)
        } else {
            debug!(expected = expected.checksum, actual, "reassembled message failed checksum");
            Err(ChecksumMismatch {
                expected: expected.checksum,
                actual,
            })
        });
        self.queue.clear();
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    pub fn is_successful(&self) -> bool {
        matches!(self.result, Some(Ok(_)))
    }

    /// The reassembled message, once it is complete and verified.
    pub fn message(&self) -> Option<&[u8]> {
        match &self.result {
            Some(Ok(message)) => Some(message),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ChecksumMismatch> {
        match &self.result {
            Some(Err(mismatch)) => Some(mismatch),
            _ => None,
        }
    }

    /// Number of fragments the transfer splits into, once known.
    pub fn expected_part_count(&self) -> Option<usize> {
        self.expected.map(|expected| expected.seq_len)
    }

    /// Parts accepted so far.
    pub fn received_parts(&self) -> usize {
        self.received
    }

    /// Fragments recovered so far.
    pub fn recovered_fragments(&self) -> usize {
        self.simple.len()
    }
}

fn upsert(parts: &mut Vec<IndexedPart>, part: IndexedPart) {
    match parts.iter_mut().find(|known| known.indexes == part.indexes) {
        Some(known) => *known = part,
        None => parts.push(part),
    }
}
