use arq_lab_abstract::SystemContext;

/// Exclusive handle to a sender's single retransmission timer.
///
/// The state machines never call `start_timer`/`stop_timer` directly; they go
/// through this handle, which tracks whether the timer is live. That turns
/// the "at most one timer, start and stop in matched pairs" discipline into
/// an assertion-checked property instead of a call-order convention.
#[derive(Debug, Default)]
pub struct RetransmitTimer {
    armed: bool,
}

impl RetransmitTimer {
    pub fn new() -> Self {
        Self { armed: false }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Start the timer. The handle must not already be armed.
    pub fn arm(&mut self, ctx: &mut dyn SystemContext, delay_ms: u64) {
        debug_assert!(!self.armed, "retransmission timer armed twice");
        ctx.start_timer(delay_ms);
        self.armed = true;
    }

    /// Restart the timer, superseding a running one if present.
    pub fn rearm(&mut self, ctx: &mut dyn SystemContext, delay_ms: u64) {
        if self.armed {
            ctx.stop_timer();
        }
        ctx.start_timer(delay_ms);
        self.armed = true;
    }

    /// Stop the running timer.
    pub fn disarm(&mut self, ctx: &mut dyn SystemContext) {
        debug_assert!(self.armed, "disarming a timer that is not running");
        ctx.stop_timer();
        self.armed = false;
    }

    /// Record that the timer expired on its own; the handle may be armed
    /// again afterwards.
    pub fn fired(&mut self) {
        self.armed = false;
    }
}
