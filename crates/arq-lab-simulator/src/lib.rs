pub mod engine;
pub mod receiver;
pub mod scenario_runner;
pub mod trace;

pub use engine::{LinkEventSummary, NodeId, Simulator};
pub use receiver::{AlternatingBitReceiver, CumulativeAckReceiver};
pub use trace::SimulationReport;
