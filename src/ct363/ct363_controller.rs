use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};

use super::ct363_packet::{decode_packet, DecodeError};
use super::ct363_tracker::{ContactEvent, TrackerState, TrackerUpdate};
use crate::transport::{PacketSource, TransportError};

/// Timestamp used for controller events.
pub type Timestamp = Instant;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

type ContactCallback = Box<dyn FnMut(ContactEvent, Timestamp) + Send + 'static>;
type SyncCallback = Box<dyn FnMut(Timestamp) + Send + 'static>;

/// High-level interface for a CT363 touchscreen.
///
/// The controller reads packets from its source, reconciles them against the
/// slots held so far and notifies registered callbacks: one call per contact
/// event, then one sync call when anything changed. All polling goes through
/// `&mut self`, so a device never has two packets in flight.
pub struct Ct363Controller<S> {
    source: S,
    tracker: TrackerState,
    packets: u64,
    contact_callback: Option<ContactCallback>,
    sync_callback: Option<SyncCallback>,
}

impl<S: PacketSource> Ct363Controller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            tracker: TrackerState::new(),
            packets: 0,
            contact_callback: None,
            sync_callback: None,
        }
    }

    /// Enter the controller's polling loop. This blocks until an error occurs.
    pub fn run(mut self) -> Result<(), ControllerError> {
        loop {
            self.poll_once()?;
        }
    }

    /// Perform a single read, firing callbacks as needed.
    ///
    /// Returns whether a sync barrier was emitted. Timeouts and short reads
    /// skip the cycle and leave the held slots untouched.
    pub fn poll_once(&mut self) -> Result<bool, ControllerError> {
        match self.source.read_raw_packet() {
            Ok(packet) => Ok(self.process_packet(&packet)?),
            Err(TransportError::Timeout) => Ok(false),
            Err(err) if err.is_transient() => {
                warn!("failed to read finger data: {err}");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Decode and track one raw packet, firing callbacks as needed.
    pub fn process_packet(&mut self, buf: &[u8]) -> Result<bool, DecodeError> {
        let records = decode_packet(buf)?;
        let update = self.tracker.update(&records);
        self.packets += 1;

        debug!(
            packet = self.packets,
            events = update.events.len(),
            held = self.tracker.press_mask().len(),
            "processed packet"
        );

        Ok(self.dispatch(update))
    }

    /// Release every held slot, e.g. before dropping the device.
    pub fn release_all(&mut self) -> bool {
        let update = self.tracker.release_all();
        self.dispatch(update)
    }

    /// Install a callback to be notified about each contact event.
    pub fn set_contact_callback<F>(&mut self, callback: F)
    where
        F: FnMut(ContactEvent, Timestamp) + Send + 'static,
    {
        self.contact_callback = Some(Box::new(callback));
    }

    /// Install a callback to be notified after each batch of changed contacts.
    pub fn set_sync_callback<F>(&mut self, callback: F)
    where
        F: FnMut(Timestamp) + Send + 'static,
    {
        self.sync_callback = Some(Box::new(callback));
    }

    /// Remove all registered callbacks.
    pub fn clear_callbacks(&mut self) {
        self.contact_callback = None;
        self.sync_callback = None;
    }

    pub fn tracker(&self) -> &TrackerState {
        &self.tracker
    }

    /// Number of packets decoded so far.
    pub fn packets(&self) -> u64 {
        self.packets
    }

    fn dispatch(&mut self, update: TrackerUpdate) -> bool {
        let now = Instant::now();

        if let Some(cb) = self.contact_callback.as_mut() {
            for event in update.events {
                cb(event, now);
            }
        }
        if update.changed {
            if let Some(cb) = self.sync_callback.as_mut() {
                cb(now);
            }
        }

        update.changed
    }
}
