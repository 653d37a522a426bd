use std::time::Duration;

use rusb::{Context, DeviceHandle, Error, UsbContext};
use tracing::{info, warn};

use super::{PacketSource, TransportError};
use crate::config::UsbConfig;
use crate::ct363::PACKET_SIZE;

/// Reads CT363 packets from a USB interrupt endpoint, typically a USB-to-I2C
/// bridge forwarding the controller's finger data.
pub struct UsbSource {
    _context: Context,
    handle: DeviceHandle<Context>,
    endpoint: u8,
    timeout: Duration,
    input_buf: [u8; PACKET_SIZE],
}

impl UsbSource {
    /// Open the first device on the bus matching the configured ids.
    pub fn connect(config: &UsbConfig) -> Result<Self, TransportError> {
        let context = Context::new()?;
        let mut found = None;

        for device in context.devices()?.iter() {
            let desc = device.device_descriptor()?;
            if desc.vendor_id() == config.vendor_id && desc.product_id() == config.product_id {
                found = Some(device.open()?);
                break;
            }
        }

        let Some(handle) = found else {
            warn!(
                "no CT363 bridge found ({:04x}:{:04x})",
                config.vendor_id, config.product_id
            );
            return Err(Error::NoDevice.into());
        };

        handle.set_active_configuration(config.configuration)?;
        handle.claim_interface(config.interface)?;
        handle.set_alternate_setting(config.interface, 0)?;

        info!(
            "CT363 bridge opened ({:04x}:{:04x}, interface {}, endpoint {:#04x})",
            config.vendor_id, config.product_id, config.interface, config.endpoint
        );

        Ok(Self {
            _context: context,
            handle,
            endpoint: config.endpoint,
            timeout: Duration::from_millis(config.timeout_ms),
            input_buf: [0; PACKET_SIZE],
        })
    }
}

impl PacketSource for UsbSource {
    fn read_raw_packet(&mut self) -> Result<[u8; PACKET_SIZE], TransportError> {
        match self
            .handle
            .read_interrupt(self.endpoint, &mut self.input_buf, self.timeout)
        {
            Ok(len) if len == self.input_buf.len() => Ok(self.input_buf),
            Ok(len) => Err(TransportError::ShortRead {
                expected: PACKET_SIZE,
                actual: len,
            }),
            Err(Error::Timeout) => Err(TransportError::Timeout),
            Err(err) => Err(err.into()),
        }
    }
}
