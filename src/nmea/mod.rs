//! NMEA 0183 protocol layer: checksum, streaming decoder, sentence parsers.
//!
//! ```text
//!  UART bytes ──▶ StreamDecoder ──▶ (SentenceKind, "$...*HH") ──▶ RMC / GGA schema ──▶ records
//! ```

pub mod checksum;
pub mod decoder;
pub mod schema;
pub mod sentences;

pub use decoder::{DecoderStats, SentenceKind, StreamDecoder};
pub use sentences::{FixRecord, QualityRecord, parse_gga, parse_rmc};
