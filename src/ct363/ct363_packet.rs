use thiserror::Error;

/// Number of finger records in every packet, and number of tracking slots.
pub const MAX_POINTS: usize = 10;
/// Largest accepted X coordinate.
pub const MAX_X: u16 = 1024;
/// Largest accepted Y coordinate.
pub const MAX_Y: u16 = 768;
/// Size of one finger record on the wire.
pub const RECORD_SIZE: usize = 8;
/// Size of a full packet.
pub const PACKET_SIZE: usize = MAX_POINTS * RECORD_SIZE;

/// Coordinate byte value the controller uses to mark an empty record.
pub const SENTINEL: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("short packet buffer: expected {expected} bytes, got {actual}")]
    ShortBuffer { expected: usize, actual: usize },
}

/// Action code carried in the low three bits of the status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerStatus {
    Down,
    Move,
    Up,
    Invalid(u8),
}

impl FingerStatus {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            1 => FingerStatus::Down,
            2 => FingerStatus::Move,
            3 => FingerStatus::Up,
            other => FingerStatus::Invalid(other),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            FingerStatus::Down => 1,
            FingerStatus::Move => 2,
            FingerStatus::Up => 3,
            FingerStatus::Invalid(bits) => bits & 0x07,
        }
    }

    /// Down and Move are the only codes that describe a finger on the panel.
    pub fn is_touching(self) -> bool {
        matches!(self, FingerStatus::Down | FingerStatus::Move)
    }
}

/// One finger record exactly as the controller reports it.
///
/// Wire layout (8 bytes):
///
/// | byte | bits  | field      |
/// |------|-------|------------|
/// | 0    | 0..8  | `x_high`   |
/// | 1    | 0..8  | `y_high`   |
/// | 2    | 0..4  | `y_low`    |
/// | 2    | 4..8  | `x_low`    |
/// | 3    | 0..3  | `status`   |
/// | 3    | 3..8  | `id`       |
/// | 4    | 0..8  | `area`     |
/// | 5    | 0..8  | `pressure` |
/// | 6..8 |       | reserved   |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawFingerRecord {
    pub x_high: u8,
    pub y_high: u8,
    pub x_low: u8,
    pub y_low: u8,
    pub status: u8,
    /// Hardware slot id, 1-based. Not related to the record's position in the packet.
    pub id: u8,
    pub area: u8,
    pub pressure: u8,
}

impl RawFingerRecord {
    /// Record with sentinel coordinates, as sent for an unused slot.
    pub const EMPTY: Self = Self {
        x_high: SENTINEL,
        y_high: SENTINEL,
        x_low: 0x0F,
        y_low: 0x0F,
        status: 0x07,
        id: 0x1F,
        area: SENTINEL,
        pressure: SENTINEL,
    };

    /// Unpack a record from its wire bytes.
    pub fn from_bytes(bytes: &[u8; RECORD_SIZE]) -> Self {
        let [x_high, y_high, low, status_id, area, pressure, _, _] = *bytes;

        Self {
            x_high,
            y_high,
            x_low: low >> 4,
            y_low: low & 0x0F,
            status: status_id & 0x07,
            id: status_id >> 3,
            area,
            pressure,
        }
    }

    /// Pack the record back into wire bytes. Reserved bytes are zero.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        [
            self.x_high,
            self.y_high,
            ((self.x_low & 0x0F) << 4) | (self.y_low & 0x0F),
            ((self.id & 0x1F) << 3) | (self.status & 0x07),
            self.area,
            self.pressure,
            0,
            0,
        ]
    }

    pub fn status(&self) -> FingerStatus {
        FingerStatus::from_bits(self.status)
    }

    /// Reconstructed 12-bit X coordinate.
    pub fn x(&self) -> u16 {
        (u16::from(self.x_high) << 4) | u16::from(self.x_low & 0x0F)
    }

    /// Reconstructed 12-bit Y coordinate.
    pub fn y(&self) -> u16 {
        (u16::from(self.y_high) << 4) | u16::from(self.y_low & 0x0F)
    }

    /// Sanity filter applied before any bounds checking: no sentinel
    /// coordinate bytes and a Down or Move status.
    pub fn is_plausible(&self) -> bool {
        self.x_high != SENTINEL && self.y_high != SENTINEL && self.status().is_touching()
    }
}

/// Split a raw packet into its finger records, in buffer order.
///
/// Trailing bytes past [`PACKET_SIZE`] are ignored. Field contents are not
/// validated here; see [`RawFingerRecord::is_plausible`].
pub fn decode_packet(buf: &[u8]) -> Result<[RawFingerRecord; MAX_POINTS], DecodeError> {
    let packet = buf.get(..PACKET_SIZE).ok_or(DecodeError::ShortBuffer {
        expected: PACKET_SIZE,
        actual: buf.len(),
    })?;

    // `packet` is exactly PACKET_SIZE long, so every index below is in bounds.
    Ok(std::array::from_fn(|i| {
        let offset = i * RECORD_SIZE;
        RawFingerRecord::from_bytes(&std::array::from_fn(|j| packet[offset + j]))
    }))
}

/// Build a full packet from records, in buffer order.
pub fn encode_packet(records: &[RawFingerRecord; MAX_POINTS]) -> [u8; PACKET_SIZE] {
    let mut buf = [0u8; PACKET_SIZE];
    for (chunk, record) in buf.chunks_exact_mut(RECORD_SIZE).zip(records) {
        chunk.copy_from_slice(&record.to_bytes());
    }
    buf
}
