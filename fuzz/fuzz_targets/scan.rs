#![no_main]

use libfuzzer_sys::fuzz_target;
use safe_yaml_core::Scanner;

fuzz_target!(|data: &[u8]| fuzz_target(data));

fn fuzz_target(mut data: &[u8]) {
    let mut scanner = Scanner::new();
    scanner.set_input(&mut data);

    // The iterator ends after the stream end or the first error.
    for token in scanner.by_ref() {
        if token.is_err() {
            break;
        }
    }
    assert!(scanner.next().is_none());
}
