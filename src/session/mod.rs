//! Terminal chat session abstractions.
//!
//! The session owns rendering and input collection; the bridge only needs to
//! create channels, append lines, and consume submitted input.

use async_trait::async_trait;

/// Reserved channel for bridge-generated status lines.
pub const SYSTEM_CHANNEL: &str = "#system";

/// User activity reported by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A submitted input line, unparsed, tagged with the channel it was
    /// typed into.
    Input { channel: String, text: String },
    /// The session loop has ended and will produce no further input.
    Closed,
}

/// Terminal session contract required by the bridge.
///
/// Channels are display-only scrollback views keyed by name. Input lines come
/// back raw; command recognition happens in the bridge's dispatch layer.
#[async_trait]
pub trait ChatSession: Send {
    fn add_channel(&mut self, name: &str) -> Result<(), String>;

    fn display_message(&mut self, channel: &str, text: &str);

    /// Yields the next submitted input line, or [`SessionEvent::Closed`]
    /// once the session has shut down. Must return `Closed` on every call
    /// after [`ChatSession::request_exit`] has taken effect.
    async fn next_event(&mut self) -> SessionEvent;

    fn request_exit(&mut self);
}
