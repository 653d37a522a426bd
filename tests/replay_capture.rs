//! Replays the bundled demo capture through the full controller pipeline.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use ct363_touch::{
    config::{Config, SourceConfig},
    ct363::{Contact, ContactEvent, ControllerError, Ct363Controller},
    transport::{ReplaySource, TransportError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Seen {
    Contact(ContactEvent),
    Sync,
}

fn press(slot: u8, x: u16, y: u16) -> Seen {
    Seen::Contact(ContactEvent::Press(Contact {
        slot,
        x,
        y,
        pressure: 60,
    }))
}

fn moved(slot: u8, x: u16, y: u16) -> Seen {
    Seen::Contact(ContactEvent::Move(Contact {
        slot,
        x,
        y,
        pressure: 60,
    }))
}

fn release(slot: u8) -> Seen {
    Seen::Contact(ContactEvent::Release { slot })
}

#[test]
fn demo_capture_produces_expected_frames() -> Result<(), Box<dyn std::error::Error>> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let source = ReplaySource::open(&root.join("demos/two_finger.hex"))?;
    assert_eq!(source.remaining(), 10);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut controller = Ct363Controller::new(source);
    let contacts = Arc::clone(&seen);
    controller.set_contact_callback(move |event, _| {
        if let Ok(mut seen) = contacts.lock() {
            seen.push(Seen::Contact(event));
        }
    });
    let syncs = Arc::clone(&seen);
    controller.set_sync_callback(move |_| {
        if let Ok(mut seen) = syncs.lock() {
            seen.push(Seen::Sync);
        }
    });

    let mut barriers = Vec::new();
    loop {
        match controller.poll_once() {
            Ok(synced) => barriers.push(synced),
            Err(ControllerError::Transport(TransportError::Exhausted)) => break,
            Err(err) => return Err(err.into()),
        }
    }

    assert_eq!(
        barriers,
        vec![false, true, true, true, true, true, false, true, true, false]
    );
    assert_eq!(controller.packets(), 9);
    assert!(controller.tracker().press_mask().is_empty());

    let seen = seen.lock().map_err(|e| e.to_string())?;
    assert_eq!(
        *seen,
        vec![
            press(0, 100, 100),
            Seen::Sync,
            moved(0, 102, 101),
            Seen::Sync,
            release(0),
            Seen::Sync,
            press(2, 600, 400),
            press(1, 200, 300),
            Seen::Sync,
            moved(2, 620, 410),
            moved(1, 210, 300),
            Seen::Sync,
            moved(2, 640, 420),
            moved(1, 220, 300),
            Seen::Sync,
            release(1),
            release(2),
            Seen::Sync,
        ]
    );
    Ok(())
}

#[test]
fn bundled_config_points_at_demo_capture() -> Result<(), Box<dyn std::error::Error>> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let config = Config::load(&root.join("ct363.yml"))?;

    match config.source {
        SourceConfig::Replay(replay) => {
            assert!(root.join(replay.path).is_file());
        }
        SourceConfig::Usb(_) => panic!("bundled config should replay the demo capture"),
    }
    Ok(())
}
