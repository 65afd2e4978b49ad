#![no_main]
use libfuzzer_sys::fuzz_target;

use binscan::strings::{extract, StringsConfig};

fuzz_target!(|data: &[u8]| {
    for s in extract(data, &StringsConfig::default()) {
        assert!(s.text.bytes().all(binscan::strings::is_printable));
    }
    let _ = extract(data, &StringsConfig::maximal_runs()).count();
});
