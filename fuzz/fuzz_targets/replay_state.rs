#![no_main]

use libfuzzer_sys::fuzz_target;
use orbit_core::event::Event;
use orbit_core::log::file::StoredRecord;
use orbit_core::state::State;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let events: Vec<Event> = text
        .lines()
        .filter_map(|line| serde_json::from_str::<StoredRecord>(line).ok())
        .map(|record| record.event)
        .collect();

    let state = State::replay(&events);
    let total = u64::try_from(events.len()).unwrap_or(u64::MAX);
    assert_eq!(state.events_applied + state.events_skipped, total);
    assert_eq!(state, State::replay(&events));
});
