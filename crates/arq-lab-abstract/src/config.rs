use crate::packet::AckField;
use serde::{Deserialize, Serialize};

/// Per-sender protocol parameters.
///
/// Passed into each state machine's constructor so several sender instances
/// (e.g. both variants side by side in tests) can coexist without sharing
/// globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Maximum number of in-flight, unacknowledged packets (Go-Back-N).
    /// Stop-and-Wait ignores this; its window is fixed at 1.
    pub window_size: u32,
    /// Assumed round-trip time. The retransmission timeout is derived from
    /// it and does not adapt.
    pub rtt_ms: u64,
    /// Value stamped into the ack field of every outbound data packet.
    pub ack_flag: AckField,
}

impl SenderConfig {
    /// Fixed retransmission timeout: twice the assumed round-trip time.
    pub fn retransmit_timeout(&self) -> u64 {
        self.rtt_ms * 2
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            window_size: 8,
            rtt_ms: 20,
            ack_flag: AckField::Placeholder,
        }
    }
}

/// Channel model parameters for the simulation harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub loss_rate: f64,
    pub corrupt_rate: f64,
    pub min_latency: u64,
    pub max_latency: u64,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            loss_rate: 0.0,
            corrupt_rate: 0.0,
            min_latency: 10,
            max_latency: 100,
            seed: 0,
        }
    }
}
