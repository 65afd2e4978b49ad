#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(parser) = binscan::formats::pe::PeParser::new(data) {
        let _ = parser.imports();
    }
    let _ = binscan::triage::extract_metadata(data);
});
