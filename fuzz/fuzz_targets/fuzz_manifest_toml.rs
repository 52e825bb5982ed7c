#![no_main]

use libfuzzer_sys::fuzz_target;

use stager::infrastructure::repositories::parse_manifest;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_manifest(content);
    }
});
