//! Decoder and slot tracker for the VTL CT363 multi-touch controller.
//!
//! Raw 80-byte packets are split into ten finger records, filtered, and
//! reconciled against the slots held after the previous packet to produce
//! press, move and release events plus a sync barrier per changed frame.
//! Fingers the controller silently stops reporting are released.
//!
//! ```
//! use ct363_touch::ct363::{decode_packet, TrackerState, PACKET_SIZE};
//!
//! let mut tracker = TrackerState::new();
//! let records = decode_packet(&[0xFF; PACKET_SIZE])?;
//! let update = tracker.update(&records);
//! assert!(!update.changed);
//! # Ok::<(), ct363_touch::ct363::DecodeError>(())
//! ```

pub mod config;
pub mod ct363;
pub mod transport;
