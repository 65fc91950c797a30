#![no_main]

use libfuzzer_sys::fuzz_target;
use orbit_core::event::DomainEvent;
use orbit_core::log::file::StoredRecord;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(record) = serde_json::from_str::<StoredRecord>(line) {
        // Decoding must never panic, whatever the type/action/data combination.
        let _ = DomainEvent::decode(&record.event);
    }
});
