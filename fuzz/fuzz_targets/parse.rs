#![no_main]

use libfuzzer_sys::fuzz_target;
use safe_yaml_core::{EventData, Parser};

fuzz_target!(|data: &[u8]| fuzz_target(data));

fn fuzz_target(mut data: &[u8]) {
    let mut parser = Parser::new();
    parser.set_input(&mut data);

    let mut depth = 0usize;
    while let Ok(event) = parser.parse() {
        if event.data.is_collection_start() {
            depth += 1;
        } else if event.data.is_collection_end() {
            depth -= 1;
        }
        // Schema errors are expected for arbitrary input; panics are not.
        let _ = parser.resolve(&event);
        if let EventData::StreamEnd = event.data {
            assert_eq!(depth, 0);
            break;
        }
    }
}
