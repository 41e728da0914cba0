use crate::timer::RetransmitTimer;
use arq_lab_abstract::{ArqEndpoint, Message, Packet, SenderConfig, SystemContext, is_corrupted};

/// Stop-and-Wait ARQ sender: at most one unacknowledged packet at a time,
/// identified by an alternating sequence bit.
///
/// A message submitted while a packet is in flight is silently dropped; the
/// protocol assumes the application layer respects the one-outstanding-message
/// contract or accepts the loss.
pub struct StopAndWaitSender {
    config: SenderConfig,
    seq_bit: u32,
    in_flight: Option<Packet>,
    timer: RetransmitTimer,
}

impl StopAndWaitSender {
    pub fn new(config: SenderConfig) -> Self {
        Self {
            config,
            seq_bit: 0,
            in_flight: None,
            timer: RetransmitTimer::new(),
        }
    }

    /// An inbound ack is a duplicate when it carries the *next* expected
    /// alternating bit, i.e. it acknowledges the previous, already-confirmed
    /// packet rather than the outstanding one.
    fn is_duplicate_ack(&self, seq_num: u32) -> bool {
        seq_num == (self.seq_bit + 1) % 2
    }
}

impl ArqEndpoint for StopAndWaitSender {
    fn init(&mut self, _ctx: &mut dyn SystemContext) {
        self.seq_bit = 0;
        self.in_flight = None;
    }

    fn on_app_data(&mut self, ctx: &mut dyn SystemContext, message: Message) {
        if self.in_flight.is_some() {
            ctx.log("busy: packet in flight, dropping application message");
            return;
        }

        let packet = Packet::data(self.seq_bit, self.config.ack_flag, message.into_data());
        ctx.log(&format!(
            "sending seq={} ({} bytes)",
            self.seq_bit,
            packet.len()
        ));
        // Keep the exact packet for retransmission; resends reuse these
        // bytes, checksum included.
        self.in_flight = Some(packet.clone());
        ctx.transmit(packet);
        self.timer.arm(ctx, self.config.retransmit_timeout());
    }

    fn on_packet(&mut self, ctx: &mut dyn SystemContext, packet: Packet) {
        // A corrupted ack is treated like a lost one: no state change, the
        // pending timer covers recovery.
        if is_corrupted(&packet) || self.is_duplicate_ack(packet.header.seq_num) {
            ctx.log(&format!(
                "ignoring corrupt or duplicate ack (seq={})",
                packet.header.seq_num
            ));
            return;
        }

        if self.in_flight.take().is_some() {
            ctx.log(&format!("ack accepted for seq={}", self.seq_bit));
            self.seq_bit = (self.seq_bit + 1) % 2;
            self.timer.disarm(ctx);
        }
    }

    fn on_timer(&mut self, ctx: &mut dyn SystemContext) {
        self.timer.fired();
        let Some(packet) = &self.in_flight else {
            return;
        };
        ctx.log(&format!(
            "timeout: retransmitting seq={}",
            packet.header.seq_num
        ));
        ctx.transmit(packet.clone());
        self.timer.arm(ctx, self.config.retransmit_timeout());
    }
}

#[cfg(test)]
mod tests {
    use super::StopAndWaitSender;
    use crate::test_support::MockContext;
    use arq_lab_abstract::{AckField, ArqEndpoint, Message, Packet, SenderConfig};

    fn sender() -> StopAndWaitSender {
        StopAndWaitSender::new(SenderConfig::default())
    }

    fn ack(seq: u32) -> Packet {
        Packet::ack(seq, AckField::Placeholder)
    }

    #[test]
    fn submit_builds_packet_and_starts_timer() {
        let mut ctx = MockContext::default();
        let mut s = sender();

        s.on_app_data(&mut ctx, Message::new(*b"HI"));

        let sent = ctx.transmitted();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header.seq_num, 0);
        assert_eq!(sent[0].header.ack_flag, 1);
        assert_eq!(sent[0].header.checksum, 1 + 72 + 73);
        assert_eq!(sent[0].payload, b"HI");
        assert_eq!(ctx.timer_starts(), vec![40]);
    }

    #[test]
    fn submit_while_in_flight_is_dropped_without_side_effects() {
        let mut ctx = MockContext::default();
        let mut s = sender();

        s.on_app_data(&mut ctx, Message::new(*b"first"));
        ctx.clear();
        s.on_app_data(&mut ctx, Message::new(*b"second"));

        assert!(ctx.effects.is_empty());

        // The original packet is still the one retransmitted on timeout.
        s.on_timer(&mut ctx);
        let sent = ctx.transmitted();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].payload, b"first");
    }

    #[test]
    fn matching_ack_clears_flight_flips_bit_and_stops_timer() {
        let mut ctx = MockContext::default();
        let mut s = sender();

        s.on_app_data(&mut ctx, Message::new(*b"HI"));
        ctx.clear();
        s.on_packet(&mut ctx, ack(0));

        assert_eq!(ctx.timer_stops(), 1);
        assert!(ctx.transmitted().is_empty());

        // Next message goes out with the flipped bit.
        s.on_app_data(&mut ctx, Message::new(*b"again"));
        assert_eq!(ctx.transmitted()[0].header.seq_num, 1);
    }

    #[test]
    fn ack_for_previous_bit_is_ignored() {
        let mut ctx = MockContext::default();
        let mut s = sender();

        s.on_app_data(&mut ctx, Message::new(*b"HI"));
        ctx.clear();

        // Outstanding bit is 0; an ack carrying bit 1 acknowledges the
        // previous round and must not advance anything.
        s.on_packet(&mut ctx, ack(1));
        assert!(ctx.effects.is_empty());

        s.on_packet(&mut ctx, ack(0));
        assert_eq!(ctx.timer_stops(), 1);
    }

    #[test]
    fn corrupted_ack_is_ignored() {
        let mut ctx = MockContext::default();
        let mut s = sender();

        s.on_app_data(&mut ctx, Message::new(*b"HI"));
        ctx.clear();

        let mut bad = ack(0);
        bad.header.checksum = bad.header.checksum.wrapping_add(7);
        s.on_packet(&mut ctx, bad);
        assert!(ctx.effects.is_empty());
    }

    #[test]
    fn timeout_retransmits_identical_bytes_and_restarts_timer() {
        let mut ctx = MockContext::default();
        let mut s = sender();

        s.on_app_data(&mut ctx, Message::new(*b"HI"));
        let original = ctx.transmitted()[0].clone();
        ctx.clear();

        s.on_timer(&mut ctx);
        s.on_timer(&mut ctx);

        let resent = ctx.transmitted();
        assert_eq!(resent.len(), 2);
        assert_eq!(*resent[0], original);
        assert_eq!(*resent[1], original);
        assert_eq!(ctx.timer_starts(), vec![40, 40]);
    }

    #[test]
    fn alternating_bit_follows_message_parity() {
        let mut ctx = MockContext::default();
        let mut s = sender();

        for k in 0u32..6 {
            s.on_app_data(&mut ctx, Message::new(vec![k as u8]));
            let seq = ctx.transmitted().last().unwrap().header.seq_num;
            assert_eq!(seq, k % 2);
            s.on_packet(&mut ctx, ack(seq));
        }
    }

    #[test]
    fn stray_ack_while_idle_changes_nothing() {
        let mut ctx = MockContext::default();
        let mut s = sender();

        s.on_packet(&mut ctx, ack(0));
        assert!(ctx.effects.is_empty());

        // The bit is still 0 for the first real message.
        s.on_app_data(&mut ctx, Message::new(*b"HI"));
        assert_eq!(ctx.transmitted()[0].header.seq_num, 0);
    }
}
