use crate::config::SimConfig;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub description: String,
    pub config: SimConfigOverride,
    pub actions: Vec<TestAction>,
    pub assertions: Vec<TestAssertion>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SimConfigOverride {
    pub loss_rate: Option<f64>,
    pub corrupt_rate: Option<f64>,
    pub min_latency: Option<u64>,
    pub max_latency: Option<u64>,
    pub seed: Option<u64>,
}

impl SimConfigOverride {
    pub fn apply_to(&self, config: &mut SimConfig) {
        if let Some(v) = self.loss_rate {
            config.loss_rate = v;
        }
        if let Some(v) = self.corrupt_rate {
            config.corrupt_rate = v;
        }
        if let Some(v) = self.min_latency {
            config.min_latency = v;
        }
        if let Some(v) = self.max_latency {
            config.max_latency = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAction {
    /// Application submits a message at a specific time
    AppSend { time: u64, data: String },
    /// Deterministically drop the first data packet from the sender with the given seq number
    DropNextFromSenderSeq { seq: u32 },
    /// Deterministically drop the first ACK from the receiver for the given seq number
    DropNextFromReceiverAck { seq: u32 },
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAssertion {
    /// Assert that specific data was delivered to the application layer
    DataDelivered { data: String },
    /// Assert that the total number of packets sent by the sender is within range
    SenderPacketCount { min: u32, max: Option<u32> },
    /// Assert that the simulation finishes within time
    MaxDuration { ms: u64 },
}
