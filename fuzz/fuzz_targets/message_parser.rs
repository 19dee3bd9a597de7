//! Fuzz target for IRC message parsing
//!
//! Feeds arbitrary bytes to both parsers and re-encodes whatever parses,
//! checking that nothing panics and that the two parsers agree.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_wire::{MessageRecord, MessageRef, WireEncode};

fuzz_target!(|data: &[u8]| {
    // Over 512 bytes is unusual for IRC
    if data.len() > 512 {
        return;
    }

    let record = MessageRecord::from_line(data);
    let lazy = record.as_message_ref();
    let eager = MessageRef::parse(data);
    assert_eq!(lazy, eager);

    if let Ok(msg) = eager {
        // Encoding a parsed line must succeed.
        let line = msg.to_bytes().unwrap();
        if let Ok(reparsed) = MessageRef::parse(&line) {
            assert_eq!(reparsed.command(), msg.command());
            assert_eq!(reparsed.trailing(), msg.trailing());
        }
    }
});
