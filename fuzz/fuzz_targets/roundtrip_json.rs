#![no_main]
use libfuzzer_sys::fuzz_target;

use autoserde::json::{from_slice, to_vec};
use autoserde::CodecOptions;

fuzz_target!(|data: &[u8]| {
    // This comment keeps rustfmt from breaking the fuzz macro...
    if let Ok(val) = from_slice(data) {
        for options in &[CodecOptions::new(), CodecOptions::new().indent(2)] {
            let encoded = to_vec(&val, options).unwrap();
            let redecoded = from_slice(&encoded[..]).unwrap();
            assert_eq!(val, redecoded);
        }
    }
});
