//! streamrelay bridges named remote pub/sub streams to an interactive
//! chat-style terminal session.
//!
//! The transport and the terminal session are external collaborators behind
//! the [`StreamTransport`] and [`ChatSession`] traits. [`StreamBridge`] wires
//! them together: each configured stream gets a display channel of the same
//! name, inbound events render there, and submitted input lines go back out
//! through command dispatch as stream publishes.

pub mod commands;
pub mod core;
pub mod session;
pub mod transport;
pub mod utils;

pub use crate::core::bridge::{Phase, StopHandle, StreamBridge};
pub use crate::core::publisher::{PublishService, PublishTicket};
pub use crate::session::{ChatSession, SessionEvent, SYSTEM_CHANNEL};
pub use crate::transport::{InboundEvent, Payload, StreamTransport};
