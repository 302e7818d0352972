//! Bytewords: the 256-word alphabet UR bodies are written in.
//!
//! Every encoded body carries a trailing big-endian CRC-32 of the payload.
//! The minimal style keeps only the first and last letter of each word,
//! which is what appears inside `ur:` strings.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

use super::crc32;

const WORDS: &str = concat!(
    "ableacidalsoapexaquaarchatomauntawayaxisbackbaldbarnbeltbetabias",
    "bluebodybragbrewbulbbuzzcalmcashcatschefcityclawcodecolacookcost",
    "cruxcurlcuspcyandarkdatadaysdelidicedietdoordowndrawdropdrumdull",
    "dutyeacheasyechoedgeepicevenexamexiteyesfactfairfernfigsfilmfish",
    "fizzflapflewfluxfoxyfreefrogfuelfundgalagamegeargemsgiftgirlglow",
    "goodgraygrimgurugushgyrohalfhanghardhawkheathelphighhillholyhope",
    "hornhutsicedideaidleinchinkyintoirisironitemjadejazzjoinjoltjowl",
    "judojugsjumpjunkjurykeepkenokeptkeyskickkilnkingkitekiwiknoblamb",
    "lavalazyleaflegsliarlimplionlistlogoloudloveluaulucklungmainmany",
    "mathmazememomenumeowmildmintmissmonknailnavyneednewsnextnoonnote",
    "numbobeyoboeomitonyxopenovalowlspaidpartpeckplaypluspoempoolpose",
    "puffpumapurrquadquizraceramprealredorichroadrockroofrubyruinruns",
    "rustsafesagascarsetssilkskewslotsoapsolosongstubsurfswantacotask",
    "taxitenttiedtimetinytoiltombtoystriptunatwinuglyundouniturgeuser",
    "vastveryvetovialvibeviewvisavoidvowswallwandwarmwaspwavewaxywebs",
    "whatwhenwhizwolfworkyankyawnyellyogayurtzapszerozestzinczonezoom",
);

const CHECKSUM_LEN: usize = 4;

/// Minimum number of words in a valid body: one payload byte plus the checksum.
const MIN_WORDS: usize = CHECKSUM_LEN + 1;

static FULL_LOOKUP: Lazy<HashMap<&'static str, u8>> =
    Lazy::new(|| (0..=u8::MAX).map(|byte| (word(byte), byte)).collect());

static MINIMAL_LOOKUP: Lazy<HashMap<[u8; 2], u8>> = Lazy::new(|| {
    (0..=u8::MAX)
        .map(|byte| {
            let letters = word(byte).as_bytes();
            ([letters[0], letters[3]], byte)
        })
        .collect()
});

/// How words are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Full words separated by spaces.
    Standard,
    /// Full words separated by hyphens.
    Uri,
    /// First and last letter of each word, no separator.
    Minimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BytewordsError {
    #[error("invalid byteword `{0}`")]
    InvalidWord(String),
    #[error("minimal bytewords must have an even length, found {0} characters")]
    OddLength(usize),
    #[error("bytewords body too short: {0} words")]
    TooShort(usize),
    #[error("bytewords checksum mismatch (expected {expected:08x}, found {found:08x})")]
    Checksum { expected: u32, found: u32 },
}

fn word(byte: u8) -> &'static str {
    let start = usize::from(byte) * 4;
    &WORDS[start..start + 4]
}

/// Encodes `data` followed by its checksum.
pub fn encode(data: &[u8], style: Style) -> String {
    let checksum = crc32::checksum(data).to_be_bytes();
    let bytes = data.iter().chain(checksum.iter()).copied();
    match style {
        Style::Standard => join_words(bytes, " "),
        Style::Uri => join_words(bytes, "-"),
        Style::Minimal => bytes
            .flat_map(|byte| {
                let letters = word(byte).as_bytes();
                [char::from(letters[0]), char::from(letters[3])]
            })
            .collect(),
    }
}

fn join_words(bytes: impl Iterator<Item = u8>, separator: &str) -> String {
    bytes.map(word).collect::<Vec<_>>().join(separator)
}

/// Decodes a body, verifies its checksum and returns the payload.
///
/// Input is matched case-insensitively.
pub fn decode(encoded: &str, style: Style) -> Result<Vec<u8>, BytewordsError> {
    let lowered = encoded.to_ascii_lowercase();
    let bytes = match style {
        Style::Standard => decode_words(lowered.split(' '))?,
        Style::Uri => decode_words(lowered.split('-'))?,
        Style::Minimal => decode_minimal(&lowered)?,
    };

    if bytes.len() < MIN_WORDS {
        return Err(BytewordsError::TooShort(bytes.len()));
    }

    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let expected = u32::from_be_bytes([checksum[0], checksum[1], checksum[2], checksum[3]]);
    let found = crc32::checksum(payload);
    if expected != found {
        return Err(BytewordsError::Checksum { expected, found });
    }
    Ok(payload.to_vec())
}

fn decode_words<'a>(words: impl Iterator<Item = &'a str>) -> Result<Vec<u8>, BytewordsError> {
    words
        .map(|w| {
            FULL_LOOKUP
                .get(w)
                .copied()
                .ok_or_else(|| BytewordsError::InvalidWord(w.to_owned()))
        })
        .collect()
}

fn decode_minimal(encoded: &str) -> Result<Vec<u8>, BytewordsError> {
    let raw = encoded.as_bytes();
    if raw.len() % 2 != 0 {
        return Err(BytewordsError::OddLength(raw.len()));
    }
    raw.chunks_exact(2)
        .map(|pair| {
            MINIMAL_LOOKUP
                .get(&[pair[0], pair[1]])
                .copied()
                .ok_or_else(|| BytewordsError::InvalidWord(String::from_utf8_lossy(pair).into_owned()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [u8; 5] = [0, 1, 2, 128, 255];

    #[test]
    fn table_has_256_distinct_words() {
        assert_eq!(WORDS.len(), 1024);
        assert_eq!(FULL_LOOKUP.len(), 256);
        assert_eq!(MINIMAL_LOOKUP.len(), 256);
        assert_eq!(word(0), "able");
        assert_eq!(word(128), "lava");
        assert_eq!(word(255), "zoom");
    }

    #[test]
    fn encodes_all_styles() {
        assert_eq!(
            encode(&SAMPLE, Style::Standard),
            "able acid also lava zoom jade need echo taxi"
        );
        assert_eq!(
            encode(&SAMPLE, Style::Uri),
            "able-acid-also-lava-zoom-jade-need-echo-taxi"
        );
        assert_eq!(encode(&SAMPLE, Style::Minimal), "aeadaolazmjendeoti");
    }

    #[test]
    fn decodes_all_styles() {
        for style in [Style::Standard, Style::Uri, Style::Minimal] {
            let encoded = encode(&SAMPLE, style);
            assert_eq!(decode(&encoded, style).unwrap(), SAMPLE);
        }
        assert_eq!(decode("AEADAOLAZMJENDEOTI", Style::Minimal).unwrap(), SAMPLE);
    }

    #[test]
    fn rejects_bad_checksum() {
        // last word changed from `ti` (taxi) to `tk` (task)
        let err = decode("aeadaolazmjendeotk", Style::Minimal).unwrap_err();
        assert!(matches!(err, BytewordsError::Checksum { .. }));
    }

    #[test]
    fn rejects_malformed_bodies() {
        assert_eq!(
            decode("aeadaolazmjendeot", Style::Minimal),
            Err(BytewordsError::OddLength(17))
        );
        assert_eq!(
            decode("aeadaolazmjendeoxx", Style::Minimal),
            Err(BytewordsError::InvalidWord("xx".into()))
        );
        assert_eq!(decode("aeadaola", Style::Minimal), Err(BytewordsError::TooShort(4)));
        assert!(matches!(
            decode("able acid also lava zoom jade need echo taxis", Style::Standard),
            Err(BytewordsError::InvalidWord(_))
        ));
    }
}
