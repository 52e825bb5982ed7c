#![no_main]

use libfuzzer_sys::fuzz_target;

use stager::infrastructure::repositories::{parse_lockfile, render_lockfile};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Anything that decodes must re-encode to something that decodes again
        if let Ok(lock) = parse_lockfile(content) {
            let rendered = render_lockfile(&lock).expect("decoded lock renders");
            let reparsed = parse_lockfile(&rendered).expect("rendered lock decodes");
            assert_eq!(reparsed.packages().len(), lock.packages().len());
        }
    }
});
