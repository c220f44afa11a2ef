//! Fuzz target: `parse_property_set`
//!
//! Drives arbitrary bytes through the inbound property-set parser and
//! asserts that anything accepted expands into in-range commands.
//!
//! cargo fuzz run fuzz_remote_command

#![no_main]

use baitfeeder::app::commands::{parse_property_set, AppCommand};
use baitfeeder::config::FeedInterval;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(props) = parse_property_set(data) else {
        return;
    };

    let current = FeedInterval::new(23, 59, 59);
    let cmds = props.into_commands(current);
    assert!(cmds.len() <= 2, "at most one command per kind");

    for cmd in cmds {
        if let AppCommand::UpdateInterval(i) = cmd {
            assert!(i.validate().is_ok(), "merged interval out of range: {:?}", i);
        }
    }
});
