//! Byte-encoding detection for raw input files.
//!
//! Detection never trusts a declared encoding. The bytes are inspected in this
//! order:
//!
//! 1. A byte-order mark decides the encoding outright.
//! 2. Pure ASCII content is reported as UTF-8.
//! 3. Otherwise a statistical detector guesses. When the guess is not
//!    confident, the configured default encoding is used if it decodes the
//!    bytes cleanly; if it does not, the low-confidence guess is kept.

use std::borrow::Cow;
use std::fmt;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

/// How the encoding of a file was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    ByteOrderMark,
    Ascii,
    Statistical,
    /// The detector was indeterminate and the declared default was used.
    Fallback,
}

/// The outcome of encoding detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectedEncoding {
    #[serde(serialize_with = "serialize_encoding")]
    pub encoding: &'static Encoding,
    pub method: DetectionMethod,
    /// Length of the byte-order mark to skip, zero when there is none.
    #[serde(skip)]
    pub bom_length: usize,
}

fn serialize_encoding<S: Serializer>(
    encoding: &&'static Encoding,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(encoding.name())
}

impl DetectedEncoding {
    fn new(encoding: &'static Encoding, method: DetectionMethod) -> Self {
        Self {
            encoding,
            method,
            bom_length: 0,
        }
    }

    /// Canonical name of the encoding, e.g. `UTF-8` or `windows-1252`.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Strictly decodes `bytes`, skipping any byte-order mark.
    ///
    /// Returns `None` when the content contains malformed sequences.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        let body = bytes.get(self.bom_length..).unwrap_or_default();
        self.encoding
            .decode_without_bom_handling_and_without_replacement(body)
    }
}

impl fmt::Display for DetectedEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.name(), self.method)
    }
}

/// Decides the encoding of `bytes`, using `fallback` when detection is
/// indeterminate.
pub fn detect_encoding(bytes: &[u8], fallback: &'static Encoding) -> DetectedEncoding {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        debug!(encoding = encoding.name(), "Encoding decided by byte-order mark");
        return DetectedEncoding {
            encoding,
            method: DetectionMethod::ByteOrderMark,
            bom_length,
        };
    }

    if bytes.is_ascii() {
        return DetectedEncoding::new(encoding_rs::UTF_8, DetectionMethod::Ascii);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let (guess, confident) = detector.guess_assess(None, true);
    if confident {
        debug!(encoding = guess.name(), "Encoding detected statistically");
        return DetectedEncoding::new(guess, DetectionMethod::Statistical);
    }

    if fallback
        .decode_without_bom_handling_and_without_replacement(bytes)
        .is_some()
    {
        warn!(
            guess = guess.name(),
            fallback = fallback.name(),
            "Encoding detection indeterminate; using declared default"
        );
        return DetectedEncoding::new(fallback, DetectionMethod::Fallback);
    }

    warn!(
        guess = guess.name(),
        fallback = fallback.name(),
        "Encoding detection indeterminate and default does not fit; keeping best guess"
    );
    DetectedEncoding::new(guess, DetectionMethod::Statistical)
}
