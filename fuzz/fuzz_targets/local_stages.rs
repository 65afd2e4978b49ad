#![no_main]
use libfuzzer_sys::fuzz_target;

use binscan::io::AnalysisTarget;
use binscan::strings::StringsConfig;

fuzz_target!(|data: &[u8]| {
    let target = AnalysisTarget::from_bytes("<fuzz>", data.to_vec());
    let _ = binscan::triage::analyze_local(&target, &StringsConfig::maximal_runs());
});
