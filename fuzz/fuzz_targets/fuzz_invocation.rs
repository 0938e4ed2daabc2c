//! Fuzz target: Typst command-line construction.
//!
//! Splits the input into a template and `key=value` lines, builds the
//! invocation, and checks that every accepted binding appears exactly once
//! as its own `--input` argument.

#![no_main]

use libfuzzer_sys::fuzz_target;
use press_core::CompileRequest;
use press_executor::TypstCompiler;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut lines = text.lines();
    let template = lines.next().unwrap_or_default();

    let mut request = CompileRequest::new(template);
    for line in lines {
        if let Some((key, value)) = line.split_once('=') {
            let _ = request.variables.insert(key, value);
        }
    }

    let invocation = TypstCompiler::with_defaults().invocation(&request);
    assert_eq!(&invocation.args[..3], &["compile", "-", "-"]);
    assert_eq!(invocation.args.len(), 3 + 2 * request.variables.len());
    for (key, value) in &request.variables {
        let binding = format!("{key}={value}");
        assert_eq!(invocation.args.iter().filter(|a| **a == binding).count(), 1);
    }
});
