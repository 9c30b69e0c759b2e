#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Metadata document parsing must never panic on arbitrary input
    let _ = serde_json::from_slice::<savekeep::backup::record::BackupMeta>(data);
});
