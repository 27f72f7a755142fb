//! Stream identifiers — the short human-readable codes that name a photo stream.

use rand::Rng;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid stream identifier `{0}`")]
pub struct InvalidStreamId(pub String);

/// A stream identifier: two groups of four uppercase letters, e.g. `ABCD-EFGH`.
///
/// The identifier doubles as the storage key prefix component and as the
/// broadcast room name. Parsing is the sole authorization gate on inbound
/// requests; anything that is not exactly `[A-Z]{4}-[A-Z]{4}` is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId(String);

impl StreamId {
    /// Draw a fresh identifier, one uniform A–Z draw per character.
    ///
    /// Not cryptographically strong; the 26^8 search space is demo-grade and
    /// collisions are ignored by design.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut raw = String::with_capacity(9);
        for position in 0..9 {
            if position == 4 {
                raw.push('-');
            } else {
                raw.push(rng.gen_range(b'A'..=b'Z') as char);
            }
        }
        StreamId(raw)
    }

    /// Accept a candidate identifier, or reject it with `InvalidStreamId`.
    pub fn parse(candidate: &str) -> Result<Self, InvalidStreamId> {
        let bytes = candidate.as_bytes();
        let well_formed = bytes.len() == 9
            && bytes[4] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || b.is_ascii_uppercase());
        if well_formed {
            Ok(StreamId(candidate.to_string()))
        } else {
            Err(InvalidStreamId(candidate.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_codes() {
        assert!(StreamId::parse("ABCD-EFGH").is_ok());
        assert!(StreamId::parse("ZZZZ-AAAA").is_ok());
    }

    #[test]
    fn rejects_everything_else() {
        for candidate in [
            "",
            "abcd-efgh",
            "ABCD-EFG",
            "ABCDEFGH",
            "ABCD_EFGH",
            "ABCD-EFGH ",
            " ABCD-EFGH",
            "1BCD-EFGH",
            "ABCD-EFG1",
            "ABCD-EFGH-IJKL",
            "ÀBCD-EFGH",
        ] {
            assert!(
                StreamId::parse(candidate).is_err(),
                "accepted {:?}",
                candidate
            );
        }
    }

    #[test]
    fn generated_codes_validate() {
        for _ in 0..100 {
            let id = StreamId::generate();
            assert!(StreamId::parse(id.as_str()).is_ok(), "generated {}", id);
        }
    }
}
