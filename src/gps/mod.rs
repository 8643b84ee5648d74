//! GPS receiver: serial reads → decoded records → shared snapshot.
//!
//! [`GpsReceiver::poll`] is one decoder-worker cycle.  It keeps a private
//! working copy of each record, so fields missing from a sentence keep
//! their previous value, and publishes the whole record after every
//! successful parse.
//!
//! When the speed filter is enabled, the published `FixRecord::speed_kmh`
//! carries the filtered estimate; the working copy keeps the raw value.

pub mod commands;

use log::debug;

use crate::app::ports::{SerialError, SerialPort};
use crate::config::SystemConfig;
use crate::control::kalman::SpeedFilter;
use crate::nmea::{
    DecoderStats, FixRecord, QualityRecord, SentenceKind, StreamDecoder, parse_gga, parse_rmc,
};
use crate::shared::{FrameCounters, SharedState};

/// Bytes requested per serial read.
pub const READ_CHUNK: usize = 512;

pub struct GpsReceiver<S: SerialPort> {
    port: S,
    decoder: StreamDecoder,
    fix: FixRecord,
    quality: QualityRecord,
    filter: Option<SpeedFilter>,
    hdop_scaling: bool,
    read_timeout_ms: u32,
    buf: [u8; READ_CHUNK],
}

impl<S: SerialPort> GpsReceiver<S> {
    pub fn new(port: S, config: &SystemConfig) -> Self {
        let filter = config.filter_enabled.then(|| {
            SpeedFilter::new(config.filter_process_noise, config.filter_measurement_noise)
        });
        Self {
            port,
            decoder: StreamDecoder::new(),
            fix: FixRecord::default(),
            quality: QualityRecord::default(),
            filter,
            hdop_scaling: config.filter_hdop_scaling,
            read_timeout_ms: config.gps_read_timeout_ms,
            buf: [0; READ_CHUNK],
        }
    }

    /// One read-decode-publish cycle.
    ///
    /// Returns the number of sentences dispatched; a read timeout is `Ok(0)`.
    pub fn poll(&mut self, shared: &SharedState) -> Result<usize, SerialError> {
        let n = self.port.read(&mut self.buf, self.read_timeout_ms)?;
        if n == 0 {
            return Ok(0);
        }

        let Self {
            decoder,
            fix,
            quality,
            filter,
            hdop_scaling,
            buf,
            ..
        } = &mut *self;

        let dispatched = decoder.feed(&buf[..n], |kind, sentence| match kind {
            SentenceKind::Rmc => {
                if !parse_rmc(sentence, fix) {
                    return;
                }
                match filter.as_mut() {
                    Some(f) if fix.valid => {
                        if *hdop_scaling {
                            f.scale_for_hdop(quality.hdop);
                        }
                        let mut published = fix.clone();
                        published.speed_kmh = f.update(fix.speed_kmh);
                        shared.publish_fix(&published);
                    }
                    _ => shared.publish_fix(fix),
                }
            }
            SentenceKind::Gga => {
                if parse_gga(sentence, quality) {
                    shared.publish_quality(*quality);
                }
            }
        });

        let stats = self.decoder.stats();
        shared.publish_frames(FrameCounters {
            sentences: stats.sentences,
            position_sentences: stats.position_sentences,
            checksum_failures: stats.checksum_failures,
        });
        if dispatched > 0 {
            debug!(
                "GPS: {} sentences (total={} rmc={} bad_cs={})",
                dispatched, stats.sentences, stats.position_sentences, stats.checksum_failures
            );
        }
        Ok(dispatched)
    }

    pub fn stats(&self) -> &DecoderStats {
        self.decoder.stats()
    }

    pub fn filter(&self) -> Option<&SpeedFilter> {
        self.filter.as_ref()
    }

    /// Transport access for receiver configuration.
    pub fn port_mut(&mut self) -> &mut S {
        &mut self.port
    }
}
