//! Property-based tests for the CT363 decoder and slot tracker.
//!
//! Packets are generated from a mix of touching, lifted, sentinel and
//! out-of-range records so every filter path gets exercised.

use ct363_touch::ct363::{
    contacts, decode_packet, encode_packet, ContactEventKind, PressMask,
    RawFingerRecord, TrackerState, MAX_POINTS, MAX_X, MAX_Y, PACKET_SIZE,
};
use proptest::prelude::*;

fn record_strategy() -> impl Strategy<Value = RawFingerRecord> {
    prop_oneof![
        // Mostly valid fingers on a small id range so slots get reused.
        4 => (1u8..=6, 0u16..=MAX_X, 0u16..=MAX_Y, 1u8..=2, any::<u8>()).prop_map(
            |(id, x, y, status, pressure)| RawFingerRecord {
                x_high: (x >> 4) as u8,
                x_low: (x & 0x0F) as u8,
                y_high: (y >> 4) as u8,
                y_low: (y & 0x0F) as u8,
                status,
                id,
                area: 0,
                pressure,
            }
        ),
        2 => Just(RawFingerRecord::EMPTY),
        1 => any::<[u8; 8]>().prop_map(|bytes| RawFingerRecord::from_bytes(&bytes)),
    ]
}

fn packet_strategy() -> impl Strategy<Value = [RawFingerRecord; MAX_POINTS]> {
    proptest::array::uniform10(record_strategy())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Decoding never panics; it fails exactly when the buffer is too short.
    #[test]
    fn prop_decode_length_guard(buf in proptest::collection::vec(any::<u8>(), 0..=2 * PACKET_SIZE)) {
        let result = decode_packet(&buf);
        prop_assert_eq!(result.is_ok(), buf.len() >= PACKET_SIZE);
    }

    /// Record `i` comes from bytes `i*8..i*8+8`, whatever the record's own id says.
    #[test]
    fn prop_records_follow_buffer_offsets(buf in any::<[[u8; 8]; MAX_POINTS]>()) {
        let flat: Vec<u8> = buf.iter().flatten().copied().collect();
        let decoded = decode_packet(&flat);
        prop_assert!(decoded.is_ok());
        if let Ok(records) = decoded {
            for (record, bytes) in records.iter().zip(&buf) {
                prop_assert_eq!(*record, RawFingerRecord::from_bytes(bytes));
            }
        }
    }

    /// Encoding a tracked packet and decoding it again tracks the same way.
    #[test]
    fn prop_encoded_packets_track_identically(packet in packet_strategy()) {
        let mut direct = TrackerState::new();
        let mut via_wire = TrackerState::new();

        let decoded = decode_packet(&encode_packet(&packet));
        prop_assert!(decoded.is_ok());
        if let Ok(records) = decoded {
            prop_assert_eq!(direct.update(&packet), via_wire.update(&records));
        }
    }

    /// After every update the mask holds exactly the slots of accepted contacts.
    #[test]
    fn prop_mask_tracks_accepted_contacts(packets in proptest::collection::vec(packet_strategy(), 1..8)) {
        let mut tracker = TrackerState::new();
        for packet in &packets {
            tracker.update(packet);
            let mut expected = PressMask::EMPTY;
            for contact in contacts(packet) {
                expected.insert(contact.slot);
            }
            prop_assert_eq!(tracker.press_mask(), expected);
        }
    }

    /// Presses and releases alternate per slot, starting with a press.
    #[test]
    fn prop_press_release_pairing(packets in proptest::collection::vec(packet_strategy(), 1..16)) {
        let mut tracker = TrackerState::new();
        let mut held = [false; MAX_POINTS];

        for packet in &packets {
            for event in tracker.update(packet).events {
                let slot = usize::from(event.slot());
                prop_assert!(slot < MAX_POINTS);
                match event.kind() {
                    ContactEventKind::Press => {
                        prop_assert!(!held[slot], "double press on slot {}", slot);
                        held[slot] = true;
                    }
                    ContactEventKind::Move => {
                        prop_assert!(held[slot], "move on released slot {}", slot);
                    }
                    ContactEventKind::Release => {
                        prop_assert!(held[slot], "release without press on slot {}", slot);
                        held[slot] = false;
                    }
                }
            }
        }

        for event in tracker.release_all().events {
            let slot = usize::from(event.slot());
            prop_assert!(held[slot]);
            held[slot] = false;
        }
        prop_assert!(held.iter().all(|h| !h));
    }

    /// Releases come after all presses and moves, in ascending slot order.
    #[test]
    fn prop_release_ordering(first in packet_strategy(), second in packet_strategy()) {
        let mut tracker = TrackerState::new();
        tracker.update(&first);
        let update = tracker.update(&second);

        let first_release = update
            .events
            .iter()
            .position(|e| e.kind() == ContactEventKind::Release)
            .unwrap_or(update.events.len());
        let (touches, releases) = update.events.split_at(first_release);

        prop_assert!(touches.iter().all(|e| e.kind() != ContactEventKind::Release));
        prop_assert!(releases.iter().all(|e| e.kind() == ContactEventKind::Release));
        prop_assert!(releases.windows(2).all(|w| w[0].slot() < w[1].slot()));
        prop_assert_eq!(update.changed, !update.events.is_empty());
    }

    /// Accepted contacts always lie inside the axis limits.
    #[test]
    fn prop_contacts_within_bounds(records in proptest::array::uniform10(any::<[u8; 8]>())) {
        let records = records.map(|bytes| RawFingerRecord::from_bytes(&bytes));
        let mut tracker = TrackerState::new();
        for event in tracker.update(&records).events {
            if let Some(contact) = event.contact() {
                prop_assert!(contact.x <= MAX_X && contact.y <= MAX_Y);
            }
        }
    }

    /// Once the panel is empty, further empty packets change nothing.
    #[test]
    fn prop_empty_packets_idempotent(packet in packet_strategy(), repeats in 1usize..5) {
        let mut tracker = TrackerState::new();
        tracker.update(&packet);

        let empty = [RawFingerRecord::EMPTY; MAX_POINTS];
        let first = tracker.update(&empty);
        prop_assert!(first.events.iter().all(|e| e.kind() == ContactEventKind::Release));

        for _ in 0..repeats {
            let update = tracker.update(&empty);
            prop_assert!(update.events.is_empty());
            prop_assert!(!update.changed);
            prop_assert!(tracker.press_mask().is_empty());
        }
    }
}
