//! GPIO / peripheral pin assignments for the speedwatch board (ESP32).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// GPS receiver (Quectel L80-R, UART1)
// ---------------------------------------------------------------------------

/// ESP32 TX → receiver RX.
pub const GPS_UART_TX_GPIO: i32 = 25;
/// ESP32 RX ← receiver TX.
pub const GPS_UART_RX_GPIO: i32 = 26;
/// Receiver RESET, active-low; held HIGH while running.
pub const GPS_RESET_GPIO: i32 = 23;
/// Receiver default baud rate, 8N1.
pub const GPS_BAUD: u32 = 9_600;
/// UART driver RX ring buffer.
pub const GPS_RX_BUFFER_BYTES: usize = 2_048;

// ---------------------------------------------------------------------------
// Buzzer (active-low)
// ---------------------------------------------------------------------------

/// LOW = sounding, HIGH = silent.
pub const BUZZER_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

pub const LED_GPIO: i32 = 22;

// ---------------------------------------------------------------------------
// 3-digit 7-segment display (external BCD decoder, multiplexed)
// ---------------------------------------------------------------------------

/// BCD inputs A..D (bit 0 first).
pub const DISPLAY_BCD_GPIOS: [i32; 4] = [2, 4, 13, 33];
/// Digit selects, active HIGH: units, tens, hundreds.
pub const DISPLAY_DIGIT_GPIOS: [i32; 3] = [18, 19, 21];
/// Decimal point, held off.
pub const DISPLAY_DP_GPIO: i32 = 14;
