pub mod checksum;
pub mod config;
pub mod interface;
pub mod packet;
pub mod scenario;

pub use interface::{ArqEndpoint, SystemContext};
pub use packet::{AckField, Message, Packet, PacketHeader};

pub use checksum::{checksum, is_corrupted};
pub use config::{SenderConfig, SimConfig};
pub use scenario::{SimConfigOverride, TestAction, TestAssertion, TestScenario};
