#![no_main]
use libfuzzer_sys::fuzz_target;

use autoserde::cbor::CborCodec;
use autoserde::json::{from_slice, to_vec};
use autoserde::{Codec, CodecOptions};

fuzz_target!(|data: &[u8]| {
    // This comment keeps rustfmt from breaking the fuzz macro...
    let options = CodecOptions::new();

    if let Ok(val) = from_slice(data) {
        let mut encoded = Vec::new();
        CborCodec.dump(&val, &mut encoded, &options).unwrap();
        let redecoded = CborCodec.load(&mut &encoded[..], &options).unwrap();
        assert_eq!(val, redecoded);
    }

    // Non-finite floats have no json form.
    if let Ok(val) = CborCodec.load(&mut &data[..], &options) {
        if let Ok(encoded) = to_vec(&val, &options) {
            let redecoded = from_slice(&encoded[..]).unwrap();
            assert_eq!(val, redecoded);
        }
    }
});
