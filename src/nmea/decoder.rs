//! Streaming NMEA sentence decoder.
//!
//! ```text
//!   $GPRMC,....,*6A\r\n$GPGGA,...*47\r\n$GPR
//!   └──── sentence ───┘ └─── sentence ──┘└ fragment (discarded) ┘
//! ```
//!
//! The decoder extracts `$ ... *HH` sentences from one serial read,
//! validates the checksum, and routes each valid sentence by its type tag.
//! It does not carry state across [`feed`](StreamDecoder::feed) calls: a
//! sentence split by a read boundary is discarded and counted, and the
//! receiver simply delivers the next one.
//!
//! Sentences longer than [`MAX_SENTENCE_LEN`] are dropped whole rather
//! than truncated.

use heapless::Vec;
use log::{debug, warn};

use super::checksum;

/// Maximum sentence length including `$`, `*`, and the two checksum digits.
pub const MAX_SENTENCE_LEN: usize = 128;

/// Sentence types the decoder routes to a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceKind {
    /// Recommended minimum: time, fix status, position, speed, course, date.
    Rmc,
    /// Fix information: satellites, HDOP, altitude.
    Gga,
}

impl SentenceKind {
    /// Classify a sentence by its tag (`$GPRMC`, `$GNGGA`, ...).
    ///
    /// Only the GPS (`GP`) and multi-constellation (`GN`) talkers are
    /// accepted.
    pub fn from_tag(sentence: &str) -> Option<Self> {
        let tag = sentence.strip_prefix('$')?.split([',', '*']).next()?.as_bytes();
        if tag.len() != 5 || !matches!(&tag[..2], b"GP" | b"GN") {
            return None;
        }
        match &tag[2..] {
            b"RMC" => Some(Self::Rmc),
            b"GGA" => Some(Self::Gga),
            _ => None,
        }
    }
}

/// Counters describing everything the decoder has seen since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Checksum-valid sentences of any type.
    pub sentences: u32,
    /// Checksum-valid position/velocity (RMC) sentences.
    pub position_sentences: u32,
    /// Sentences dropped on checksum mismatch.
    pub checksum_failures: u32,
    /// Sentences dropped for exceeding [`MAX_SENTENCE_LEN`].
    pub oversize: u32,
    /// Sentences terminated before a complete `*HH` checksum.
    pub malformed: u32,
    /// Valid sentences with a tag no parser handles.
    pub unknown: u32,
    /// Partial sentences discarded at a read boundary.
    pub fragments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Waiting for `$`.
    Idle,
    /// Collecting body bytes up to `*`.
    Body,
    /// Collecting the two checksum digits.
    Checksum { digits: u8 },
    /// Over-length sentence; skip until the next `$`.
    Overflow,
}

/// Streaming sentence decoder. Stack-allocated, no heap.
pub struct StreamDecoder {
    state: State,
    buf: Vec<u8, MAX_SENTENCE_LEN>,
    stats: DecoderStats,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            buf: Vec::new(),
            stats: DecoderStats::default(),
        }
    }

    /// Decode one read's worth of bytes.
    ///
    /// `on_sentence` is called once per checksum-valid sentence of a known
    /// kind, with the full sentence text (`$...*HH`).  Returns the number
    /// of sentences dispatched.
    pub fn feed(&mut self, chunk: &[u8], mut on_sentence: impl FnMut(SentenceKind, &str)) -> usize {
        let mut dispatched = 0;

        for &byte in chunk {
            if byte == b'$' {
                if matches!(self.state, State::Body | State::Checksum { .. }) {
                    // A new start marker inside a sentence: the previous one
                    // never reached its checksum.
                    self.stats.malformed += 1;
                }
                self.buf.clear();
                self.state = State::Body;
                self.push(byte);
                continue;
            }

            match self.state {
                State::Idle | State::Overflow => {}
                State::Body => match byte {
                    b'\r' | b'\n' => {
                        self.stats.malformed += 1;
                        debug!("nmea: sentence ended without checksum delimiter");
                        self.state = State::Idle;
                    }
                    b'*' => {
                        if self.push(byte) {
                            self.state = State::Checksum { digits: 0 };
                        }
                    }
                    _ => {
                        self.push(byte);
                    }
                },
                State::Checksum { digits } => {
                    if !self.push(byte) {
                        continue;
                    }
                    if digits + 1 == 2 {
                        self.state = State::Idle;
                        if self.complete(&mut on_sentence) {
                            dispatched += 1;
                        }
                    } else {
                        self.state = State::Checksum { digits: digits + 1 };
                    }
                }
            }
        }

        if matches!(self.state, State::Body | State::Checksum { .. }) {
            self.stats.fragments += 1;
        }
        self.buf.clear();
        self.state = State::Idle;

        dispatched
    }

    /// Counters since construction (or the last [`reset`](Self::reset)).
    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Clear the in-progress sentence and all counters.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.state = State::Idle;
        self.stats = DecoderStats::default();
    }

    /// Append a byte; on overflow drop the whole sentence.
    fn push(&mut self, byte: u8) -> bool {
        if self.buf.push(byte).is_ok() {
            return true;
        }
        self.stats.oversize += 1;
        warn!("nmea: sentence exceeds {} bytes, dropped", MAX_SENTENCE_LEN);
        self.buf.clear();
        self.state = State::Overflow;
        false
    }

    /// Validate and route the buffered sentence.
    fn complete(&mut self, on_sentence: &mut impl FnMut(SentenceKind, &str)) -> bool {
        let Ok(text) = core::str::from_utf8(&self.buf) else {
            self.stats.malformed += 1;
            return false;
        };

        if !checksum::verify(text) {
            self.stats.checksum_failures += 1;
            warn!(
                "nmea: checksum mismatch, dropped ({} total)",
                self.stats.checksum_failures
            );
            return false;
        }

        self.stats.sentences += 1;
        match SentenceKind::from_tag(text) {
            Some(kind) => {
                if kind == SentenceKind::Rmc {
                    self.stats.position_sentences += 1;
                }
                on_sentence(kind, text);
                true
            }
            None => {
                self.stats.unknown += 1;
                false
            }
        }
    }
}
