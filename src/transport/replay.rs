use std::{
    collections::VecDeque,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use tracing::info;

use super::{PacketSource, TransportError};
use crate::ct363::PACKET_SIZE;

/// Plays back packets from a capture file.
///
/// One packet per line, written as hex byte pairs. Whitespace between bytes
/// is allowed, `#` starts a comment and blank lines are skipped. Lines that do
/// not hold exactly one packet replay as short reads.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    packets: VecDeque<Vec<u8>>,
}

impl ReplaySource {
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let source = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(
            "loaded {} packets from {}",
            source.remaining(),
            path.display()
        );
        Ok(source)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, TransportError> {
        let mut packets = VecDeque::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let data = line.split('#').next().unwrap_or_default();
            let digits: String = data.split_whitespace().collect();
            if digits.is_empty() {
                continue;
            }
            let packet = parse_hex(&digits).map_err(|reason| TransportError::Capture {
                line: index + 1,
                reason,
            })?;
            packets.push_back(packet);
        }

        Ok(Self { packets })
    }

    pub fn remaining(&self) -> usize {
        self.packets.len()
    }
}

impl PacketSource for ReplaySource {
    fn read_raw_packet(&mut self) -> Result<[u8; PACKET_SIZE], TransportError> {
        let packet = self.packets.pop_front().ok_or(TransportError::Exhausted)?;
        <[u8; PACKET_SIZE]>::try_from(packet.as_slice()).map_err(|_| TransportError::ShortRead {
            expected: PACKET_SIZE,
            actual: packet.len(),
        })
    }
}

fn parse_hex(digits: &str) -> Result<Vec<u8>, String> {
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }

    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| match std::str::from_utf8(pair) {
            Ok(text) if pair.iter().all(u8::is_ascii_hexdigit) => {
                u8::from_str_radix(text, 16).map_err(|err| err.to_string())
            }
            _ => Err(format!(
                "invalid hex byte {:?}",
                String::from_utf8_lossy(pair)
            )),
        })
        .collect()
}
