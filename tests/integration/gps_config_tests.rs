//! Receiver configuration against the simulated UART.

use embedded_hal::delay::DelayNs;

use speedwatch::adapters::uart::SimSerial;
use speedwatch::gps::commands::{self, GpsConfigError, SentenceFilter, UpdateRate};
use speedwatch::nmea::checksum;

/// Delay that only adds up the requested time.
#[derive(Default)]
struct Elapsed {
    ns: u64,
}

impl Elapsed {
    fn ms(&self) -> u64 {
        self.ns / 1_000_000
    }
}

impl DelayNs for Elapsed {
    fn delay_ns(&mut self, ns: u32) {
        self.ns += u64::from(ns);
    }
}

fn lines(port: &SimSerial) -> Vec<String> {
    String::from_utf8(port.written().to_vec())
        .unwrap()
        .split_inclusive("\r\n")
        .map(str::to_owned)
        .collect()
}

#[test]
fn boot_sequence_on_the_wire() {
    let mut port = SimSerial::new();
    let mut delay = Elapsed::default();
    // stale bytes from before the reconfiguration
    port.push_chunk(b"$GPGSV,3,1,11*00\r\n".to_vec());

    commands::configure(&mut port, &mut delay, 5, SentenceFilter::RmcAndGga).unwrap();

    let sent = lines(&port);
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[0], "$PMTK300,200,0,0,0,0*2F\r\n");
    assert_eq!(sent[1], "$PMTK220,200*2C\r\n");
    // the sentence mask goes out twice
    assert!(sent[2].starts_with("$PMTK314,0,1,0,1,"));
    assert_eq!(sent[2], sent[3]);
    assert_eq!(port.flushes(), 1);
    assert_eq!(port.pending_chunks(), 0);
    // settle after rate, between the two masks, after the mask, after the flush
    assert_eq!(delay.ms(), 800);
}

#[test]
fn every_rate_is_well_framed() {
    for hz in 1..=5u8 {
        let mut port = SimSerial::new();
        let rate = commands::set_update_rate(&mut port, hz).unwrap();
        assert_eq!(rate, UpdateRate::try_from(hz).unwrap());
        for line in lines(&port) {
            assert!(checksum::verify(line.trim_end()), "{line:?}");
            assert!(line.contains(&rate.interval_ms().to_string()));
        }
    }
}

#[test]
fn bad_rate_sends_nothing() {
    let mut port = SimSerial::new();
    let mut delay = Elapsed::default();
    for hz in [0u8, 6, 10, 255] {
        assert_eq!(
            commands::configure(&mut port, &mut delay, hz, SentenceFilter::RmcOnly),
            Err(GpsConfigError::InvalidRate(hz))
        );
    }
    assert!(port.written().is_empty());
    assert_eq!(port.flushes(), 0);
    assert_eq!(delay.ms(), 0);
}

#[test]
fn factory_default_restores_one_hz() {
    let mut port = SimSerial::new();
    let mut delay = Elapsed::default();
    commands::set_sentence_filter(&mut port, &mut delay, SentenceFilter::FactoryDefault).unwrap();

    assert_eq!(
        lines(&port),
        vec![
            "$PMTK300,1000,0,0,0,0*1C\r\n",
            "$PMTK220,1000*1F\r\n",
            "$PMTK314,-1*04\r\n",
        ]
    );
    assert_eq!(port.flushes(), 1);
    assert_eq!(delay.ms(), 1200);
}
