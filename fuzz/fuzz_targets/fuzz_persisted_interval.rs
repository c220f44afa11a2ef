//! Fuzz target: persisted interval record decoding
//!
//! Arbitrary flash contents must decode to either a typed error or an
//! in-range interval that re-encodes to an equivalent record.
//!
//! cargo fuzz run fuzz_persisted_interval

#![no_main]

use baitfeeder::adapters::nvs::{decode_interval, encode_interval};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(interval) = decode_interval(data) {
        assert!(interval.validate().is_ok());
        let bytes = encode_interval(interval).expect("valid interval encodes");
        assert_eq!(decode_interval(&bytes), Ok(interval));
    }
});
