mod replay;
mod usb;

use thiserror::Error;

use crate::ct363::PACKET_SIZE;

pub use replay::ReplaySource;
pub use usb::UsbSource;

/// Anything that can hand the controller one raw packet per poll.
pub trait PacketSource {
    fn read_raw_packet(&mut self) -> Result<[u8; PACKET_SIZE], TransportError>;
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("timed out waiting for finger data")]
    Timeout,

    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("no more packets")]
    Exhausted,

    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("capture line {line}: {reason}")]
    Capture { line: usize, reason: String },
}

impl TransportError {
    /// Errors after which polling simply continues with the next cycle.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout | TransportError::ShortRead { .. }
        )
    }
}
