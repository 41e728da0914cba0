use crate::timer::RetransmitTimer;
use crate::window::TxWindow;
use arq_lab_abstract::{ArqEndpoint, Message, Packet, SenderConfig, SystemContext, is_corrupted};

/// Go-Back-N ARQ sender: up to `window_size` unacknowledged packets in
/// flight, cumulative acknowledgments, and a full-window resend on timeout.
///
/// One timer covers the whole window. It runs while the window is non-empty:
/// started when the first packet enters an empty window, restarted whenever a
/// cumulative ack leaves packets outstanding, stopped when the ack empties
/// the window.
pub struct GoBackNSender {
    config: SenderConfig,
    window: TxWindow,
    timer: RetransmitTimer,
}

impl GoBackNSender {
    pub fn new(config: SenderConfig) -> Self {
        let window = TxWindow::new(config.window_size);
        Self {
            config,
            window,
            timer: RetransmitTimer::new(),
        }
    }

    /// Oldest unacknowledged sequence number.
    pub fn base(&self) -> u32 {
        self.window.base()
    }

    /// Sequence number the next submitted message will carry.
    pub fn next_seq(&self) -> u32 {
        self.window.next_seq()
    }
}

impl ArqEndpoint for GoBackNSender {
    fn init(&mut self, _ctx: &mut dyn SystemContext) {
        self.window = TxWindow::new(self.config.window_size);
        self.timer = RetransmitTimer::new();
    }

    fn on_app_data(&mut self, ctx: &mut dyn SystemContext, message: Message) {
        let seq = self.window.next_seq();
        let packet = Packet::data(seq, self.config.ack_flag, message.into_data());

        // The window keeps its own copy so a timeout can resend the exact
        // bytes; full or exhausted windows refuse the message, which is
        // dropped without buffering.
        let was_empty = self.window.is_empty();
        if let Err(err) = self.window.push(packet.clone()) {
            ctx.log(&format!("dropping application message: {err}"));
            return;
        }

        ctx.log(&format!("sending seq={} ({} bytes)", seq, packet.len()));
        ctx.transmit(packet);
        if was_empty {
            self.timer.arm(ctx, self.config.retransmit_timeout());
        }
    }

    fn on_packet(&mut self, ctx: &mut dyn SystemContext, packet: Packet) {
        if is_corrupted(&packet) {
            ctx.log(&format!(
                "ignoring corrupt ack (seq={})",
                packet.header.seq_num
            ));
            return;
        }

        // Cumulative: this ack confirms every sequence number at or below
        // it. Stale acks are absorbed by the window without a separate
        // duplicate check.
        self.window.ack_through(packet.header.seq_num);
        ctx.log(&format!(
            "ack seq={} -> base={} next_seq={}",
            packet.header.seq_num,
            self.window.base(),
            self.window.next_seq()
        ));

        if self.window.is_empty() {
            if self.timer.is_armed() {
                self.timer.disarm(ctx);
            }
        } else {
            // Restart so the timer covers the new oldest unacked packet.
            self.timer.rearm(ctx, self.config.retransmit_timeout());
        }
    }

    fn on_timer(&mut self, ctx: &mut dyn SystemContext) {
        self.timer.fired();
        if self.window.is_empty() {
            return;
        }

        ctx.log(&format!(
            "timeout: resending window [{}, {})",
            self.window.base(),
            self.window.next_seq()
        ));
        self.timer.arm(ctx, self.config.retransmit_timeout());
        // Full-window resend in ascending sequence order; a single loss
        // forces retransmission of everything after it.
        for packet in self.window.iter_in_flight() {
            ctx.transmit(packet.clone());
        }
    }
}
