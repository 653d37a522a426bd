use std::fmt;

use tracing::trace;

use super::ct363_packet::{RawFingerRecord, MAX_POINTS, MAX_X, MAX_Y};

/// A finger the tracker accepted for this packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// Zero-based slot, `id - 1`.
    pub slot: u8,
    pub x: u16,
    pub y: u16,
    pub pressure: u8,
}

/// Classification for contact transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEventKind {
    Press,
    Move,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    /// Slot was not held before this contact.
    Press(Contact),
    Move(Contact),
    /// Slot stopped reporting.
    Release { slot: u8 },
}

impl ContactEvent {
    pub fn slot(&self) -> u8 {
        match self {
            ContactEvent::Press(contact) | ContactEvent::Move(contact) => contact.slot,
            ContactEvent::Release { slot } => *slot,
        }
    }

    pub fn kind(&self) -> ContactEventKind {
        match self {
            ContactEvent::Press(_) => ContactEventKind::Press,
            ContactEvent::Move(_) => ContactEventKind::Move,
            ContactEvent::Release { .. } => ContactEventKind::Release,
        }
    }

    pub fn contact(&self) -> Option<&Contact> {
        match self {
            ContactEvent::Press(contact) | ContactEvent::Move(contact) => Some(contact),
            ContactEvent::Release { .. } => None,
        }
    }
}

impl fmt::Display for ContactEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactEvent::Press(c) => write!(
                f,
                "press slot={} x={} y={} pressure={}",
                c.slot, c.x, c.y, c.pressure
            ),
            ContactEvent::Move(c) => write!(
                f,
                "move slot={} x={} y={} pressure={}",
                c.slot, c.x, c.y, c.pressure
            ),
            ContactEvent::Release { slot } => write!(f, "release slot={slot}"),
        }
    }
}

/// Why a record produced no contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Sentinel coordinates or a status other than Down/Move.
    Implausible,
    SlotOutOfRange(u8),
    OutOfBounds { x: u16, y: u16 },
}

/// Validate a single record and turn it into a contact.
pub fn contact_from_record(record: &RawFingerRecord) -> Result<Contact, Rejection> {
    if !record.is_plausible() {
        return Err(Rejection::Implausible);
    }
    if record.id == 0 || usize::from(record.id) > MAX_POINTS {
        return Err(Rejection::SlotOutOfRange(record.id));
    }

    let (x, y) = (record.x(), record.y());
    if x > MAX_X || y > MAX_Y {
        return Err(Rejection::OutOfBounds { x, y });
    }

    Ok(Contact {
        slot: record.id - 1,
        x,
        y,
        pressure: record.pressure,
    })
}

/// Accepted contacts of one packet, in input order. Rejected records are skipped.
pub fn contacts(records: &[RawFingerRecord]) -> impl Iterator<Item = Contact> + '_ {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match contact_from_record(record) {
            Ok(contact) => Some(contact),
            Err(reason) => {
                if reason != Rejection::Implausible {
                    trace!(index, ?reason, "dropping finger record");
                }
                None
            }
        })
}

/// Set of held slots, one bit per slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PressMask(u16);

impl PressMask {
    pub const EMPTY: Self = Self(0);

    pub fn from_bits(bits: u16) -> Self {
        Self(bits & Self::ALL_SLOTS)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, slot: u8) -> bool {
        usize::from(slot) < MAX_POINTS && self.0 & (1 << slot) != 0
    }

    pub fn insert(&mut self, slot: u8) {
        if usize::from(slot) < MAX_POINTS {
            self.0 |= 1 << slot;
        }
    }

    /// Slots held in `self` but not in `other`.
    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Held slots in ascending order.
    pub fn slots(self) -> impl Iterator<Item = u8> {
        (0..MAX_POINTS as u8).filter(move |&slot| self.contains(slot))
    }

    const ALL_SLOTS: u16 = (1 << MAX_POINTS) - 1;
}

/// Outcome of processing one packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerUpdate {
    /// Press/move events in input order, followed by releases in ascending slot order.
    pub events: Vec<ContactEvent>,
    /// Whether a sync barrier should follow the events.
    pub changed: bool,
}

/// Per-device slot state carried from one packet to the next.
///
/// `update` takes `&mut self`, so at most one packet is reconciled at a time
/// for a given device. Share it across threads only behind a lock or a
/// single-consumer channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    press_mask: PressMask,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots considered held after the last processed packet.
    pub fn press_mask(&self) -> PressMask {
        self.press_mask
    }

    /// Reconcile one packet against the slots held after the previous one.
    ///
    /// A slot held before and absent now is released, whatever the hardware
    /// reported for it; the controller does not reliably send Up codes.
    pub fn update(&mut self, records: &[RawFingerRecord; MAX_POINTS]) -> TrackerUpdate {
        let previous = self.press_mask;
        let mut pressed = PressMask::EMPTY;
        let mut events = Vec::with_capacity(MAX_POINTS);

        for contact in contacts(records) {
            let held = previous.contains(contact.slot) || pressed.contains(contact.slot);
            events.push(if held {
                ContactEvent::Move(contact)
            } else {
                ContactEvent::Press(contact)
            });
            pressed.insert(contact.slot);
        }

        events.extend(
            previous
                .difference(pressed)
                .slots()
                .map(|slot| ContactEvent::Release { slot }),
        );

        self.press_mask = pressed;

        TrackerUpdate {
            changed: !events.is_empty(),
            events,
        }
    }

    /// Release every held slot, e.g. when the device goes away.
    pub fn release_all(&mut self) -> TrackerUpdate {
        let events: Vec<_> = self
            .press_mask
            .slots()
            .map(|slot| ContactEvent::Release { slot })
            .collect();
        self.press_mask = PressMask::EMPTY;

        TrackerUpdate {
            changed: !events.is_empty(),
            events,
        }
    }
}
