//! Declarative per-sentence field schemas.
//!
//! Each sentence type is described by a static table of [`FieldSpec`]s:
//! field name, comma-separated position, and a converter that writes the
//! decoded value into the target record.  Adding a sentence type means
//! adding a table, not a new parser.
//!
//! Field failures are local: a missing, empty, or malformed field leaves
//! the record's previous value untouched.  Only a tag mismatch rejects the
//! sentence outright.

use heapless::Vec;
use log::trace;

/// Upper bound on fields considered per sentence; later fields are ignored.
pub const MAX_FIELDS: usize = 24;

/// Comma-separated fields of one sentence body (tag at index 0).
///
/// Empty fields keep their position, so `a,,c` yields three fields.
pub struct Fields<'a> {
    raw: Vec<&'a str, MAX_FIELDS>,
}

impl<'a> Fields<'a> {
    /// Split a `$<body>*HH` sentence into fields.
    pub fn split(sentence: &'a str) -> Self {
        let body = sentence.strip_prefix('$').unwrap_or(sentence);
        let body = body.split_once('*').map_or(body, |(b, _)| b);
        let mut raw = Vec::new();
        for field in body.split(',') {
            if raw.push(field).is_err() {
                break;
            }
        }
        Self { raw }
    }

    /// Field at `index`, or `None` when absent or empty.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.raw.get(index).copied().filter(|f| !f.is_empty())
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Converter: decode `value` (plus any companion fields) into the record.
/// Returns `None` when the value is malformed; the record is then unchanged.
pub type Converter<R> = fn(&mut R, &str, &Fields<'_>) -> Option<()>;

/// One field of a sentence schema.
pub struct FieldSpec<R: 'static> {
    pub name: &'static str,
    pub index: usize,
    pub convert: Converter<R>,
    /// Applied when the field is absent or empty.  `None` keeps the
    /// previous value.
    pub on_absent: Option<fn(&mut R)>,
}

/// Field table for one sentence type (`RMC`, `GGA`, ...).
pub struct SentenceSchema<R: 'static> {
    /// Three-letter sentence type, matched after the two-letter talker ID.
    pub sentence_type: &'static str,
    pub fields: &'static [FieldSpec<R>],
}

impl<R> SentenceSchema<R> {
    /// Whether `sentence` carries this schema's type tag.
    pub fn matches(&self, sentence: &str) -> bool {
        sentence
            .strip_prefix('$')
            .and_then(|s| s.get(2..))
            .is_some_and(|s| {
                s.starts_with(self.sentence_type)
                    && matches!(s.as_bytes().get(self.sentence_type.len()), Some(b',' | b'*') | None)
            })
    }

    /// Decode `sentence` into `record`.
    ///
    /// Returns `false` only on a tag mismatch.  Individual field failures
    /// keep the previous value and do not fail the sentence.
    pub fn apply(&self, sentence: &str, record: &mut R) -> bool {
        if !self.matches(sentence) {
            return false;
        }
        let fields = Fields::split(sentence);
        for spec in self.fields {
            match fields.get(spec.index) {
                Some(value) => {
                    if (spec.convert)(record, value, &fields).is_none() {
                        trace!(
                            "{}: field '{}' malformed ({:?}), keeping previous",
                            self.sentence_type,
                            spec.name,
                            value
                        );
                    }
                }
                None => {
                    if let Some(reset) = spec.on_absent {
                        reset(record);
                    }
                }
            }
        }
        true
    }
}
