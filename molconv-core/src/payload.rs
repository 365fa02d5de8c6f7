//! Text-or-bytes payload handling for conversion input and output.
//!
//! Molecular structure data arrives either as text (SMILES, InChI) or as
//! raw bytes (binary formats, data pulled straight from a database blob).
//! `Payload` carries both cases and normalizes them to a canonical UTF-8
//! byte representation for the child process.

use std::borrow::Cow;
use std::str::Utf8Error;

/// A conversion payload: either text or an opaque byte string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    /// Canonical byte representation. Text encodes to UTF-8, bytes pass
    /// through untouched.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(s) => s.as_bytes(),
            Payload::Bytes(b) => b,
        }
    }

    /// Consuming variant of [`as_bytes`](Self::as_bytes).
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(s) => s.into_bytes(),
            Payload::Bytes(b) => b,
        }
    }

    /// Strict text view. Bytes are decoded as UTF-8, text passes through
    /// unchanged.
    pub fn decode(&self) -> Result<Cow<'_, str>, Utf8Error> {
        match self {
            Payload::Text(s) => Ok(Cow::Borrowed(s)),
            Payload::Bytes(b) => std::str::from_utf8(b).map(Cow::Borrowed),
        }
    }

    /// Lossy text view: invalid UTF-8 sequences become replacement
    /// characters instead of failing.
    pub fn decode_lossy(&self) -> Cow<'_, str> {
        match self {
            Payload::Text(s) => Cow::Borrowed(s),
            Payload::Bytes(b) => String::from_utf8_lossy(b),
        }
    }

    /// Probes whether this payload survives a codec round trip exactly:
    /// bytes must decode to text that re-encodes to the identical bytes,
    /// text must encode to bytes that decode back to the identical text.
    /// Returns `false` for non-round-trippable inputs, never errors.
    pub fn round_trips(&self) -> bool {
        match self {
            Payload::Text(s) => match std::str::from_utf8(s.as_bytes()) {
                Ok(decoded) => decoded == s,
                Err(_) => false,
            },
            Payload::Bytes(b) => match std::str::from_utf8(b) {
                Ok(decoded) => decoded.as_bytes() == &b[..],
                Err(_) => false,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Bytes(b)
    }
}

impl From<&[u8]> for Payload {
    fn from(b: &[u8]) -> Self {
        Payload::Bytes(b.to_vec())
    }
}
