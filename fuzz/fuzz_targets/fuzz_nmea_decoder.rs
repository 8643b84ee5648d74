//! Fuzz target: `StreamDecoder::feed` + RMC/GGA parsers
//!
//! Drives arbitrary byte sequences through the NMEA stream decoder and
//! both sentence parsers, split at an input-chosen read boundary.  The
//! decoder must never panic, never dispatch an over-length or
//! checksum-invalid sentence, and parsing must be idempotent.
//!
//! cargo fuzz run fuzz_nmea_decoder

#![no_main]

use critical_section as _;
use libfuzzer_sys::fuzz_target;
use speedwatch::nmea::checksum;
use speedwatch::nmea::decoder::MAX_SENTENCE_LEN;
use speedwatch::nmea::{FixRecord, QualityRecord, StreamDecoder, parse_gga, parse_rmc};

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let cut = usize::from(split).min(rest.len());

    let mut decoder = StreamDecoder::new();
    let mut fix = FixRecord::default();
    let mut quality = QualityRecord::default();

    for chunk in [&rest[..cut], &rest[cut..]] {
        decoder.feed(chunk, |_, sentence| {
            assert!(sentence.len() <= MAX_SENTENCE_LEN);
            assert!(checksum::verify(sentence));

            parse_rmc(sentence, &mut fix);
            let once = fix.clone();
            parse_rmc(sentence, &mut fix);
            assert_eq!(once, fix, "RMC parse not idempotent");

            parse_gga(sentence, &mut quality);
            let once = quality;
            parse_gga(sentence, &mut quality);
            assert_eq!(once, quality, "GGA parse not idempotent");
        });
    }

    let stats = decoder.stats();
    assert!(stats.position_sentences <= stats.sentences);
});
