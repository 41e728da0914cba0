use crate::packet::{Message, Packet};

/// The capabilities the simulator provides to a protocol endpoint.
///
/// All calls are fire-and-forget from the endpoint's point of view: the
/// engine applies them after the current event handler returns.
pub trait SystemContext {
    /// Hand a packet to the unreliable channel. No delivery guarantee.
    fn transmit(&mut self, packet: Packet);

    /// Start this endpoint's retransmission timer; it expires after
    /// `delay_ms` and triggers `ArqEndpoint::on_timer`. Each endpoint owns
    /// exactly one logical timer, so there is no timer id; starting while a
    /// timer is running supersedes it.
    fn start_timer(&mut self, delay_ms: u64);

    /// Cancel the running timer, if any.
    fn stop_timer(&mut self);

    /// Pass received data up to the application layer (receiver side only).
    fn deliver_data(&mut self, data: &[u8]);

    /// Log a message attributed to this endpoint in the simulator output.
    fn log(&mut self, message: &str);

    /// Current simulation time in ms.
    fn now(&self) -> u64;
}

/// Event entry points of a protocol endpoint.
///
/// The engine invokes exactly one of these at a time and the handler runs to
/// completion before the next event is processed; implementations never need
/// locking or reentrancy guards.
pub trait ArqEndpoint {
    /// Called once when the simulation starts.
    fn init(&mut self, _ctx: &mut dyn SystemContext) {}

    /// Called when the application layer wants to send data reliably.
    fn on_app_data(&mut self, ctx: &mut dyn SystemContext, message: Message);

    /// Called when a (possibly corrupted) packet arrives from the channel.
    fn on_packet(&mut self, ctx: &mut dyn SystemContext, packet: Packet);

    /// Called when this endpoint's timer expires.
    fn on_timer(&mut self, ctx: &mut dyn SystemContext);
}
