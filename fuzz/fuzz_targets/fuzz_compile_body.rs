//! Fuzz target: JSON deserialization and validation of `CompileBody`.
//!
//! Arbitrary bytes fed to the body parser and validator must never panic,
//! and anything that validates must satisfy the request invariants.

#![no_main]

use libfuzzer_sys::fuzz_target;
use press_gateway::routes::CompileBody;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = serde_json::from_slice::<CompileBody>(data) else {
        return;
    };
    if let Ok(request) = body.into_request() {
        assert!(request.jobs.map_or(true, |j| j.get() >= 1));
        for (key, _) in &request.variables {
            assert!(!key.is_empty() && !key.contains('='));
        }
    }
});
