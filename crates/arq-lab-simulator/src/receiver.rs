use arq_lab_abstract::{AckField, ArqEndpoint, Message, Packet, SystemContext, is_corrupted};

/// Harness receiver for the Stop-and-Wait sender.
///
/// Delivers each in-order packet to the application and acks its sequence
/// bit; anything else (corrupt or out of order) re-acks the previous bit so
/// the sender retransmits.
pub struct AlternatingBitReceiver {
    expected_bit: u32,
}

impl AlternatingBitReceiver {
    pub fn new() -> Self {
        Self { expected_bit: 0 }
    }
}

impl Default for AlternatingBitReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl ArqEndpoint for AlternatingBitReceiver {
    fn init(&mut self, _ctx: &mut dyn SystemContext) {
        self.expected_bit = 0;
    }

    fn on_app_data(&mut self, _ctx: &mut dyn SystemContext, _message: Message) {
        // Receiver side never originates data.
    }

    fn on_packet(&mut self, ctx: &mut dyn SystemContext, packet: Packet) {
        if !is_corrupted(&packet) && packet.header.seq_num == self.expected_bit {
            ctx.log(&format!("delivering seq={}", self.expected_bit));
            ctx.deliver_data(&packet.payload);
            ctx.transmit(Packet::ack(self.expected_bit, AckField::Placeholder));
            self.expected_bit = 1 - self.expected_bit;
        } else {
            // Re-ack the last correctly received bit (bits are 0 and 1, so
            // that is 1 - expected).
            ctx.log(&format!(
                "corrupt or duplicate seq={}, re-acking {}",
                packet.header.seq_num,
                1 - self.expected_bit
            ));
            ctx.transmit(Packet::ack(1 - self.expected_bit, AckField::Placeholder));
        }
    }

    fn on_timer(&mut self, _ctx: &mut dyn SystemContext) {
        // Receiver has no timers.
    }
}

/// Harness receiver for the Go-Back-N sender.
///
/// Accepts only the next in-order sequence number, acking the highest
/// in-order sequence received so far. Out-of-order packets are discarded,
/// which is what forces the sender's full-window resend.
pub struct CumulativeAckReceiver {
    expected_seq: u32,
}

impl CumulativeAckReceiver {
    pub fn new() -> Self {
        Self { expected_seq: 0 }
    }
}

impl Default for CumulativeAckReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl ArqEndpoint for CumulativeAckReceiver {
    fn init(&mut self, _ctx: &mut dyn SystemContext) {
        self.expected_seq = 0;
    }

    fn on_app_data(&mut self, _ctx: &mut dyn SystemContext, _message: Message) {
        // Receiver side never originates data.
    }

    fn on_packet(&mut self, ctx: &mut dyn SystemContext, packet: Packet) {
        if !is_corrupted(&packet) && packet.header.seq_num == self.expected_seq {
            ctx.log(&format!("delivering seq={}", self.expected_seq));
            ctx.deliver_data(&packet.payload);
            ctx.transmit(Packet::ack(self.expected_seq, AckField::Placeholder));
            self.expected_seq += 1;
        } else if self.expected_seq > 0 {
            // Discard and re-ack the last in-order sequence; the cumulative
            // ack tells the sender where its window should start.
            ctx.log(&format!(
                "discarding seq={}, re-acking {}",
                packet.header.seq_num,
                self.expected_seq - 1
            ));
            ctx.transmit(Packet::ack(self.expected_seq - 1, AckField::Placeholder));
        } else {
            // Nothing received in order yet; stay silent and let the
            // sender's timer recover.
            ctx.log(&format!("discarding seq={}", packet.header.seq_num));
        }
    }

    fn on_timer(&mut self, _ctx: &mut dyn SystemContext) {
        // Receiver has no timers.
    }
}
