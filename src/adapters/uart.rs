//! Serial transport adapter for the GPS receiver.
//!
//! - **`target_os = "espidf"`**: [`UartSerial`] wraps an `esp-idf-hal`
//!   `UartDriver` (UART1, 9600 8N1).
//! - **`not(target_os = "espidf")`**: [`SimSerial`] replays scripted
//!   chunks, one per read, and records everything written.

use crate::app::ports::{SerialError, SerialPort};

#[cfg(target_os = "espidf")]
pub use esp_impl::UartSerial;

#[cfg(target_os = "espidf")]
mod esp_impl {
    use esp_idf_hal::delay::TickType;
    use esp_idf_hal::uart::UartDriver;
    use log::warn;

    use super::{SerialError, SerialPort};

    pub struct UartSerial {
        uart: UartDriver<'static>,
    }

    impl UartSerial {
        pub fn new(uart: UartDriver<'static>) -> Self {
            Self { uart }
        }
    }

    impl SerialPort for UartSerial {
        fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, SerialError> {
            let ticks = TickType::new_millis(u64::from(timeout_ms)).ticks();
            self.uart.read(buf, ticks).map_err(|e| {
                warn!("UART read error: {}", e);
                SerialError::ReadFailed
            })
        }

        fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
            let mut sent = 0;
            while sent < bytes.len() {
                sent += self.uart.write(&bytes[sent..]).map_err(|e| {
                    warn!("UART write error: {}", e);
                    SerialError::WriteFailed
                })?;
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), SerialError> {
            self.uart.clear_rx().map_err(|_| SerialError::ReadFailed)
        }
    }
}

// ── Host simulation ───────────────────────────────────────────

/// Scripted serial port for host runs and tests.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimSerial {
    rx: std::collections::VecDeque<Vec<u8>>,
    written: Vec<u8>,
    flushes: usize,
}

#[cfg(not(target_os = "espidf"))]
impl SimSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one chunk; each `read` returns at most one chunk.
    pub fn push_chunk(&mut self, chunk: impl Into<Vec<u8>>) {
        self.rx.push_back(chunk.into());
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    pub fn pending_chunks(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(not(target_os = "espidf"))]
impl SerialPort for SimSerial {
    fn read(&mut self, buf: &mut [u8], _timeout_ms: u32) -> Result<usize, SerialError> {
        let Some(mut chunk) = self.rx.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            // the rest arrives with the next read
            self.rx.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        self.rx.clear();
        self.flushes += 1;
        Ok(())
    }
}
