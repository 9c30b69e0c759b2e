#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Index document parsing must never panic on arbitrary input
    let _ = serde_json::from_slice::<savekeep::backup::index::BackupIndex>(data);
});
