mod ct363_controller;
mod ct363_device;
mod ct363_packet;
mod ct363_tracker;

pub use ct363_controller::{ControllerError, Ct363Controller, Timestamp};
pub use ct363_device::{AbsAxis, AxisInfo, DeviceInfo, DEVICE_INFO};
pub use ct363_packet::{
    decode_packet, encode_packet, DecodeError, FingerStatus, RawFingerRecord, MAX_POINTS, MAX_X,
    MAX_Y, PACKET_SIZE, RECORD_SIZE, SENTINEL,
};
pub use ct363_tracker::{
    contact_from_record, contacts, Contact, ContactEvent, ContactEventKind, PressMask, Rejection,
    TrackerState, TrackerUpdate,
};
