use serde::{Deserialize, Serialize};

/// Value carried in a packet's ack field.
///
/// The protocol does not piggy-back acknowledgments yet, so the only
/// sanctioned value is `Placeholder` (wire value 1). The tagged type is kept
/// so a future piggy-backed ack becomes a new variant instead of a magic
/// number scattered through the senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AckField {
    #[default]
    Placeholder,
}

impl AckField {
    /// Integer encoded into `PacketHeader::ack_flag`.
    pub fn wire_value(self) -> u32 {
        match self {
            AckField::Placeholder => 1,
        }
    }
}

/// Opaque application payload handed to a sender.
///
/// Produced by the application layer, consumed exactly once to build one
/// packet. The sender never inspects the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    data: Vec<u8>,
}

impl Message {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PacketHeader {
    /// Sequence number. Stop-and-Wait restricts this to {0, 1}; Go-Back-N
    /// uses a monotonically increasing counter.
    pub seq_num: u32,
    /// Ack field as transmitted. Outbound data packets stamp
    /// `AckField::wire_value()` here; kept raw so corrupted inbound values
    /// still feed the checksum verification.
    pub ack_flag: u32,
    /// Additive checksum over seq_num, ack_flag and the payload bytes.
    pub checksum: u32,
}

impl PacketHeader {
    pub fn new(seq_num: u32, ack_flag: u32, checksum: u32) -> Self {
        Self {
            seq_num,
            ack_flag,
            checksum,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(header: PacketHeader, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    /// Build a data packet with a freshly computed checksum.
    pub fn data(seq_num: u32, ack: AckField, payload: Vec<u8>) -> Self {
        let ack_flag = ack.wire_value();
        let checksum = crate::checksum::checksum(seq_num, ack_flag, &payload);
        Self {
            header: PacketHeader::new(seq_num, ack_flag, checksum),
            payload,
        }
    }

    /// Build an empty acknowledgment packet for `seq_num`.
    pub fn ack(seq_num: u32, ack: AckField) -> Self {
        Self::data(seq_num, ack, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
