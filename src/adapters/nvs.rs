//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`IntervalStore`] and [`StoragePort`] for the feeder.
//!
//! The feed interval lives under namespace `feeder`, key `interval`, as a
//! postcard-encoded [`PersistedInterval`].  The `marker` field tells a
//! written record apart from an erased or foreign one.
//!
//! - Validation: the interval is range-checked before persistence and
//!   again after decoding.
//! - Durability: ESP-IDF NVS commits after every write, so `Ok` means the
//!   value survives a reset.

use crate::app::ports::{ConfigError, IntervalStore, StorageError, StoragePort};
use crate::config::FeedInterval;
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const INTERVAL_NAMESPACE: &str = "feeder";
const INTERVAL_KEY: &str = "interval";

/// Written alongside every interval record.
pub const VALID_MARKER: u16 = 0xFEFE;

/// Postcard output for a record is at most a handful of bytes.
const RECORD_BUF_LEN: usize = 16;

/// On-flash interval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedInterval {
    pub marker: u16,
    pub interval: FeedInterval,
}

/// Encode `interval` as a marked record.
pub fn encode_interval(interval: FeedInterval) -> Result<Vec<u8>, ConfigError> {
    let record = PersistedInterval {
        marker: VALID_MARKER,
        interval,
    };
    postcard::to_allocvec(&record).map_err(|_| ConfigError::IoError)
}

/// Decode a stored record.  Missing marker, bad bytes and out-of-range
/// fields are all reported as [`ConfigError::Corrupted`].
pub fn decode_interval(bytes: &[u8]) -> Result<FeedInterval, ConfigError> {
    let record: PersistedInterval =
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
    if record.marker != VALID_MARKER {
        return Err(ConfigError::Corrupted);
    }
    record
        .interval
        .validate()
        .map_err(|_| ConfigError::Corrupted)?;
    Ok(record.interval)
}

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
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
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
                warn!("NVS: erasing and re-initialising flash partition");
                let ret2 = unsafe { nvs_flash_erase() };
                if ret2 != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
                let ret3 = unsafe { nvs_flash_init() };
                if ret3 != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as i32 {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Copy `s` into a NUL-terminated buffer (NVS names are at most 15 bytes).
    #[cfg(target_os = "espidf")]
    fn c_name(s: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let bytes = s.as_bytes();
        let len = bytes.len().min(15);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns_buf = Self::c_name(namespace);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: ns_buf is NUL-terminated and outlives the call.
        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let result = f(handle);
        // SAFETY: handle was opened above and is not used after this.
        unsafe {
            nvs_close(handle);
        }
        result
    }

    fn load_record(&self) -> Result<FeedInterval, ConfigError> {
        let mut buf = [0u8; RECORD_BUF_LEN];
        let len = self.read(INTERVAL_NAMESPACE, INTERVAL_KEY, &mut buf)?;
        decode_interval(&buf[..len])
    }

    /// Marker of the stored record, without range-checking its interval.
    fn load_marker(&self) -> Option<u16> {
        let mut buf = [0u8; RECORD_BUF_LEN];
        let len = self.read(INTERVAL_NAMESPACE, INTERVAL_KEY, &mut buf).ok()?;
        postcard::from_bytes::<PersistedInterval>(&buf[..len])
            .ok()
            .map(|record| record.marker)
    }
}

impl IntervalStore for NvsAdapter {
    fn read_interval(&self) -> FeedInterval {
        match self.load_record() {
            Ok(interval) => interval,
            Err(ConfigError::NotFound) => {
                info!("NvsAdapter: no interval record, feeding disabled");
                FeedInterval::DISABLED
            }
            Err(e) => {
                warn!("NvsAdapter: interval record unusable ({}), feeding disabled", e);
                FeedInterval::DISABLED
            }
        }
    }

    fn write_interval(&mut self, interval: FeedInterval) -> Result<(), ConfigError> {
        interval.validate().map_err(ConfigError::ValidationFailed)?;
        let bytes = encode_interval(interval)?;
        self.write(INTERVAL_NAMESPACE, INTERVAL_KEY, &bytes)?;
        info!(
            "NvsAdapter: interval saved ({:02}:{:02}:{:02}, {} bytes)",
            interval.hours,
            interval.minutes,
            interval.seconds,
            bytes.len()
        );
        Ok(())
    }

    /// A marked record counts even when its interval is out of range;
    /// such a record reads as disabled rather than being replaced.
    fn is_provisioned(&self) -> bool {
        self.load_marker() == Some(VALID_MARKER)
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key_buf = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let mut size = buf.len();
                // SAFETY: key_buf is NUL-terminated; buf is writable for `size` bytes.
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(size)
            });
            match result {
                Ok(size) => Ok(size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => Err(StorageError::NotFound),
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}", e);
                    Err(StorageError::IoError)
                }
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key_buf = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                // SAFETY: key_buf is NUL-terminated; data is valid for data.len() bytes.
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        data.as_ptr() as *const _,
                        data.len(),
                    )
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                // SAFETY: handle is open read-write.
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|e| {
                warn!("NvsAdapter: NVS write error {}", e);
                if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE as i32 {
                    StorageError::Full
                } else {
                    StorageError::IoError
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_is_unprovisioned_and_disabled() {
        let nvs = NvsAdapter::new().unwrap();
        assert!(!nvs.is_provisioned());
        assert_eq!(nvs.read_interval(), FeedInterval::DISABLED);
    }

    #[test]
    fn interval_persists() {
        let mut nvs = NvsAdapter::new().unwrap();
        nvs.write_interval(FeedInterval::new(1, 2, 3)).unwrap();
        assert!(nvs.is_provisioned());
        assert_eq!(nvs.read_interval(), FeedInterval::new(1, 2, 3));
    }

    #[test]
    fn rejects_out_of_range_before_writing() {
        let mut nvs = NvsAdapter::new().unwrap();
        let err = nvs.write_interval(FeedInterval::new(0, 60, 0)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed(_)));
        let mut buf = [0u8; RECORD_BUF_LEN];
        assert!(matches!(
            nvs.read(INTERVAL_NAMESPACE, INTERVAL_KEY, &mut buf),
            Err(StorageError::NotFound)
        ));
    }

    #[test]
    fn wrong_marker_reads_as_disabled() {
        let mut nvs = NvsAdapter::new().unwrap();
        let record = PersistedInterval {
            marker: 0x1234,
            interval: FeedInterval::new(0, 5, 0),
        };
        let bytes = postcard::to_allocvec(&record).unwrap();
        nvs.write(INTERVAL_NAMESPACE, INTERVAL_KEY, &bytes).unwrap();

        assert!(!nvs.is_provisioned());
        assert_eq!(nvs.read_interval(), FeedInterval::DISABLED);
    }

    #[test]
    fn out_of_range_record_reads_as_disabled() {
        let mut nvs = NvsAdapter::new().unwrap();
        let record = PersistedInterval {
            marker: VALID_MARKER,
            interval: FeedInterval::new(24, 0, 0),
        };
        let bytes = postcard::to_allocvec(&record).unwrap();
        nvs.write(INTERVAL_NAMESPACE, INTERVAL_KEY, &bytes).unwrap();

        assert!(nvs.is_provisioned());
        assert_eq!(nvs.read_interval(), FeedInterval::DISABLED);
    }

    #[test]
    fn garbage_record_reads_as_disabled() {
        let mut nvs = NvsAdapter::new().unwrap();
        nvs.write(INTERVAL_NAMESPACE, INTERVAL_KEY, &[0xFF]).unwrap();
        assert_eq!(nvs.read_interval(), FeedInterval::DISABLED);
        assert_eq!(decode_interval(&[]), Err(ConfigError::Corrupted));
    }

    #[test]
    fn storage_round_trip() {
        let mut nvs = NvsAdapter::new().unwrap();
        let data = b"hello NVS";
        nvs.write("test_ns", "greeting", data).unwrap();

        let mut buf = [0u8; 64];
        let len = nvs.read("test_ns", "greeting", &mut buf).unwrap();
        assert_eq!(&buf[..len], data);
    }

    #[test]
    fn storage_read_missing_key() {
        let nvs = NvsAdapter::new().unwrap();
        let mut buf = [0u8; 64];
        assert!(matches!(
            nvs.read("ns", "nope", &mut buf),
            Err(StorageError::NotFound)
        ));
    }

    #[test]
    fn namespace_isolation() {
        let mut nvs = NvsAdapter::new().unwrap();
        nvs.write("ns_a", "key", b"alpha").unwrap();
        nvs.write("ns_b", "key", b"bravo").unwrap();

        let mut buf = [0u8; 64];
        let len = nvs.read("ns_a", "key", &mut buf).unwrap();
        assert_eq!(&buf[..len], b"alpha");

        let len = nvs.read("ns_b", "key", &mut buf).unwrap();
        assert_eq!(&buf[..len], b"bravo");
    }
}
