#![no_main]

use libfuzzer_sys::fuzz_target;

use stager::domain::value_objects::{Requirement, Version};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = content.parse::<Version>();
        if let Ok(requirement) = content.parse::<Requirement>() {
            // The canonical rendering is itself parseable
            let _ = requirement
                .to_string()
                .parse::<Requirement>()
                .expect("rendered requirement parses");
        }
    }
});
