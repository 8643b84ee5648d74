//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] and [`CounterStore`].
//!
//! | Data           | Namespace    | Key       | Encoding       |
//! |----------------|--------------|-----------|----------------|
//! | crossing count | `almacen`    | `eventos` | `u32`          |
//! | system config  | `speedwatch` | `syscfg`  | postcard blob  |
//!
//! - Config validation: all fields are range-checked before persistence.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - On host targets an in-memory map stands in for flash.

use crate::app::ports::{ConfigError, ConfigPort, CounterStore, StorageError};
use crate::config::SystemConfig;
use log::info;

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "speedwatch";
#[cfg(not(target_os = "espidf"))]
const CONFIG_KEY: &str = "syscfg";

const COUNTER_NAMESPACE: &str = "almacen";
#[cfg(not(target_os = "espidf"))]
const COUNTER_KEY: &str = "eventos";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
    /// Simulated write failure, for exercising the degraded path.
    #[cfg(not(target_os = "espidf"))]
    fail_writes: bool,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably. On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any worker starts.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                let ret2 = unsafe { nvs_flash_erase() };
                if ret2 != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                let ret3 = unsafe { nvs_flash_init() };
                if ret3 != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
            #[cfg(not(target_os = "espidf"))]
            fail_writes: false,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Make every subsequent write fail (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = namespace.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: ns_buf is NUL-terminated; handle is closed below.
        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

/// Range and cross-field checks applied before a config is saved.
pub fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    if !(0.0..=300.0).contains(&cfg.speed_threshold_kmh) {
        return Err(ConfigError::ValidationFailed(
            "speed_threshold_kmh must be 0–300",
        ));
    }
    if !(0.0..=50.0).contains(&cfg.movement_floor_kmh) {
        return Err(ConfigError::ValidationFailed(
            "movement_floor_kmh must be 0–50",
        ));
    }
    if cfg.movement_floor_kmh > cfg.speed_threshold_kmh {
        return Err(ConfigError::ValidationFailed(
            "movement_floor_kmh must be <= speed_threshold_kmh",
        ));
    }
    if !(1..=5).contains(&cfg.gps_update_rate_hz) {
        return Err(ConfigError::ValidationFailed(
            "gps_update_rate_hz must be 1–5",
        ));
    }
    if !(cfg.filter_process_noise.is_finite() && cfg.filter_process_noise > 0.0) {
        return Err(ConfigError::ValidationFailed(
            "filter_process_noise must be > 0",
        ));
    }
    if !(cfg.filter_measurement_noise.is_finite() && cfg.filter_measurement_noise > 0.0) {
        return Err(ConfigError::ValidationFailed(
            "filter_measurement_noise must be > 0",
        ));
    }
    if !(10..=1000).contains(&cfg.gps_read_timeout_ms) {
        return Err(ConfigError::ValidationFailed(
            "gps_read_timeout_ms must be 10–1000",
        ));
    }
    if cfg.gps_idle_ms > 1000 {
        return Err(ConfigError::ValidationFailed("gps_idle_ms must be 0–1000"));
    }
    if !(10..=1000).contains(&cfg.monitor_period_ms) {
        return Err(ConfigError::ValidationFailed(
            "monitor_period_ms must be 10–1000",
        ));
    }
    if !(10..=5000).contains(&cfg.no_signal_backoff_ms)
        || !(10..=5000).contains(&cfg.no_fix_backoff_ms)
    {
        return Err(ConfigError::ValidationFailed(
            "diagnostic backoff must be 10–5000 ms",
        ));
    }
    if !(1..=20).contains(&cfg.display_digit_ms) {
        return Err(ConfigError::ValidationFailed(
            "display_digit_ms must be 1–20",
        ));
    }
    let a = &cfg.alert;
    if !(10..=1000).contains(&a.beep_ms) || a.beep_gap_ms == 0 || a.group_pause_ms == 0 {
        return Err(ConfigError::ValidationFailed(
            "alert timing must be non-zero, beep_ms 10–1000",
        ));
    }
    if !(10..=1000).contains(&a.crossing_pulse_ms) || !(10..=1000).contains(&a.reset_pulse_ms) {
        return Err(ConfigError::ValidationFailed(
            "alert pulses must be 10–1000 ms",
        ));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            if let Some(bytes) = self.store.borrow().get(&key) {
                let cfg: SystemConfig =
                    postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                info!("NvsAdapter: loaded config from store");
                Ok(cfg)
            } else {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, false, |handle| {
                let key_cstr = b"syscfg\0";
                let mut size: usize = 0;

                // First call: get size
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_cstr.as_ptr() as *const _,
                        core::ptr::null_mut(),
                        &mut size,
                    )
                };
                if ret == ESP_ERR_NVS_NOT_FOUND {
                    return Err(ESP_ERR_NVS_NOT_FOUND);
                }
                if ret != ESP_OK || size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ret);
                }

                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_cstr.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }

                Ok(buf)
            });

            match result {
                Ok(bytes) => {
                    let cfg: SystemConfig =
                        postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                    info!("NvsAdapter: loaded config from NVS ({} bytes)", bytes.len());
                    Ok(cfg)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("NvsAdapter: no stored config, using defaults");
                    Ok(SystemConfig::default())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}, using defaults", e);
                    Ok(SystemConfig::default())
                }
            }
        }
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config)?;

        #[cfg(not(target_os = "espidf"))]
        {
            if self.fail_writes {
                return Err(ConfigError::IoError);
            }
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
            self.store.borrow_mut().insert(key, bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, true, |handle| {
                let key_cstr = b"syscfg\0";
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_cstr.as_ptr() as *const _,
                        bytes.as_ptr() as *const _,
                        bytes.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE => Err(ConfigError::StorageFull),
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}

impl CounterStore for NvsAdapter {
    fn get(&self) -> Result<Option<u32>, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(COUNTER_NAMESPACE, COUNTER_KEY);
            match self.store.borrow().get(&key) {
                Some(bytes) => {
                    let raw: [u8; 4] = bytes
                        .as_slice()
                        .try_into()
                        .map_err(|_| StorageError::IoError)?;
                    Ok(Some(u32::from_le_bytes(raw)))
                }
                None => Ok(None),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(COUNTER_NAMESPACE, false, |handle| {
                let mut value: u32 = 0;
                let ret = unsafe { nvs_get_u32(handle, b"eventos\0".as_ptr() as *const _, &mut value) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(value)
            });
            match result {
                Ok(v) => {
                    info!("NvsAdapter: counter loaded ({})", v);
                    Ok(Some(v))
                }
                // A namespace that was never written does not exist yet.
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Ok(None),
                Err(e) => {
                    warn!("NvsAdapter: counter read error {}", e);
                    Err(StorageError::IoError)
                }
            }
        }
    }

    fn set(&mut self, value: u32) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            if self.fail_writes {
                return Err(StorageError::IoError);
            }
            let key = Self::composite_key(COUNTER_NAMESPACE, COUNTER_KEY);
            self.store.borrow_mut().insert(key, value.to_le_bytes().to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(COUNTER_NAMESPACE, true, |handle| {
                let ret = unsafe { nvs_set_u32(handle, b"eventos\0".as_ptr() as *const _, value) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => Ok(()),
                Err(e) if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE => Err(StorageError::Full),
                Err(e) => {
                    warn!("NvsAdapter: counter write error {}", e);
                    Err(StorageError::IoError)
                }
            }
        }
    }
}
