//! Three-digit multiplexed 7-segment display.
//!
//! Four shared BCD lines feed an external decoder; three digit-select
//! lines light one digit at a time.  Each [`step`](SevenSegDisplay::step)
//! lights the next digit, hundreds first, and the caller holds it for the
//! per-digit on-time before stepping again.
//!
//! Digit numbering follows the board silkscreen: 1 = units, 3 = hundreds.

use crate::app::ports::DISPLAY_MAX;
use crate::drivers::hw_init;
use crate::pins;

/// Scan order: hundreds, tens, units.
const SCAN: [u8; 3] = [3, 2, 1];

/// `[hundreds, tens, units]` of `value` clamped to 0..=999.
pub fn split_digits(value: u16) -> [u8; 3] {
    let n = value.min(DISPLAY_MAX);
    [(n / 100 % 10) as u8, (n / 10 % 10) as u8, (n % 10) as u8]
}

/// What one multiplex step put on the pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LitDigit {
    /// 1 = units, 2 = tens, 3 = hundreds.
    pub position: u8,
    pub bcd: u8,
}

pub struct SevenSegDisplay {
    phase: usize,
    /// Value latched at the start of each scan, so a scan never mixes two values.
    latched: [u8; 3],
    lit: Option<LitDigit>,
}

impl SevenSegDisplay {
    pub fn new() -> Self {
        Self {
            phase: 0,
            latched: [0; 3],
            lit: None,
        }
    }

    /// Light the next digit of `value`.
    pub fn step(&mut self, value: u16) -> LitDigit {
        if self.phase == 0 {
            self.latched = split_digits(value);
        }
        let position = SCAN[self.phase];
        let bcd = self.latched[self.phase];
        write_digit(position, bcd);

        self.phase = (self.phase + 1) % SCAN.len();
        let lit = LitDigit { position, bcd };
        self.lit = Some(lit);
        lit
    }

    /// Blank all digits.
    pub fn blank(&mut self) {
        for &pin in &pins::DISPLAY_DIGIT_GPIOS {
            hw_init::gpio_write(pin, false);
        }
        self.lit = None;
        self.phase = 0;
    }

    pub fn lit(&self) -> Option<LitDigit> {
        self.lit
    }
}

impl Default for SevenSegDisplay {
    fn default() -> Self {
        Self::new()
    }
}

fn write_digit(position: u8, bcd: u8) {
    for (bit, &pin) in pins::DISPLAY_BCD_GPIOS.iter().enumerate() {
        hw_init::gpio_write(pin, (bcd >> bit) & 1 == 1);
    }
    for (i, &pin) in pins::DISPLAY_DIGIT_GPIOS.iter().enumerate() {
        hw_init::gpio_write(pin, usize::from(position) == i + 1);
    }
}
