use crate::packet::Packet;

/// Additive checksum over a packet's header fields and payload bytes.
///
/// This is the sum of the sequence number, the ack field and every payload
/// byte, with wrapping arithmetic. It detects accidental bit corruption in
/// the channel and nothing more; it is not a cryptographic digest and must
/// not be treated as one.
pub fn checksum(seq_num: u32, ack_flag: u32, payload: &[u8]) -> u32 {
    let mut sum = seq_num.wrapping_add(ack_flag);
    for &byte in payload {
        sum = sum.wrapping_add(byte as u32);
    }
    sum
}

/// Recompute the checksum from the packet's own fields and compare it with
/// the stamped value. A mismatch means the packet was corrupted in transit;
/// callers treat such a packet exactly like a lost one.
pub fn is_corrupted(packet: &Packet) -> bool {
    checksum(
        packet.header.seq_num,
        packet.header.ack_flag,
        &packet.payload,
    ) != packet.header.checksum
}
