//! Sender-side ARQ state machines.
//!
//! Two variants are provided: [`StopAndWaitSender`] (window of one, single
//! alternating sequence bit) and [`GoBackNSender`] (bounded window,
//! cumulative acknowledgments, full-window retransmission on timeout). Both
//! are driven exclusively through the [`ArqEndpoint`] event entry points and
//! reach the outside world only through [`SystemContext`].
//!
//! [`ArqEndpoint`]: arq_lab_abstract::ArqEndpoint
//! [`SystemContext`]: arq_lab_abstract::SystemContext

pub mod go_back_n;
pub mod stop_and_wait;
pub mod timer;
pub mod window;

pub use go_back_n::GoBackNSender;
pub use stop_and_wait::StopAndWaitSender;
pub use timer::RetransmitTimer;
pub use window::{TxWindow, WindowError};
