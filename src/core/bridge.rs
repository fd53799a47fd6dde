//! The routing core: a bidirectional bridge between named pub/sub streams
//! and a chat session.
//!
//! Inbound events render into the display channel named after their stream;
//! submitted input lines come back through command dispatch and out as
//! stream publishes. The bridge owns both external handles and introduces no
//! shared mutable state beyond its construction-time registrations.

use std::error::Error;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::commands::{self, CommandResult};
use crate::core::publisher::{PublishService, PublishTicket};
use crate::session::{ChatSession, SessionEvent, SYSTEM_CHANNEL};
use crate::transport::{InboundEvent, Payload, StreamTransport};

type MessageObserver = Box<dyn Fn(&InboundEvent) + Send>;

/// Bridge lifecycle phase. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Constructed,
    Running,
    Stopped,
}

/// Stops a running bridge from outside its event loop.
#[derive(Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }
}

pub struct StreamBridge<S: ChatSession> {
    session: S,
    streams: Vec<String>,
    events: mpsc::UnboundedReceiver<InboundEvent>,
    // Held so the event queue outlives any transport that drops its sender.
    _events_tx: mpsc::UnboundedSender<InboundEvent>,
    publisher: PublishService,
    observers: Vec<(Option<String>, MessageObserver)>,
    stop_token: CancellationToken,
    phase: Phase,
}

impl<S: ChatSession> StreamBridge<S> {
    /// Wires the bridge: the reserved system channel, then one subscription
    /// and one display channel per unique stream name, in input order.
    /// Registration failures propagate; partial registrations are not rolled
    /// back. Must be called from within a tokio runtime.
    pub fn new(
        transport: Arc<dyn StreamTransport>,
        streams: &[String],
        mut session: S,
    ) -> Result<Self, Box<dyn Error>> {
        if streams.is_empty() {
            return Err("at least one stream name is required".into());
        }

        let (events_tx, events) = mpsc::unbounded_channel();

        session.add_channel(SYSTEM_CHANNEL)?;

        let mut registered: Vec<String> = Vec::new();
        for name in streams {
            if registered.iter().any(|existing| existing == name) {
                continue;
            }
            transport.subscribe(name, events_tx.clone())?;
            session.add_channel(name)?;
            debug!(stream = %name, "stream attached");
            registered.push(name.clone());
        }

        let publisher = PublishService::spawn(transport);

        Ok(Self {
            session,
            streams: registered,
            events,
            _events_tx: events_tx,
            publisher,
            observers: Vec::new(),
            stop_token: CancellationToken::new(),
            phase: Phase::Constructed,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn streams(&self) -> &[String] {
        &self.streams
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            token: self.stop_token.clone(),
        }
    }

    /// Appends a line to one of the session's channels.
    pub fn display_message(&mut self, channel: &str, text: &str) {
        self.session.display_message(channel, text);
    }

    /// Registers an observer invoked after each inbound event is rendered.
    /// `stream: None` observes every stream.
    pub fn on_message<F>(&mut self, stream: Option<&str>, observer: F)
    where
        F: Fn(&InboundEvent) + Send + 'static,
    {
        self.observers
            .push((stream.map(str::to_string), Box::new(observer)));
    }

    /// Queues a publish directly, outside the chat input path. The returned
    /// ticket resolves when the transport send completes.
    pub async fn publish(&self, stream: &str, payload: Payload) -> PublishTicket {
        self.publisher.enqueue(stream, payload).await
    }

    /// Runs the bridge until the session closes, `/quit` is entered, or a
    /// stop handle fires. Returns immediately on a stopped bridge.
    pub async fn run(&mut self) {
        if self.phase == Phase::Stopped {
            return;
        }
        self.phase = Phase::Running;

        loop {
            tokio::select! {
                maybe_event = self.events.recv() => {
                    if let Some(event) = maybe_event {
                        self.render_inbound(event);
                    }
                }
                event = self.session.next_event() => match event {
                    SessionEvent::Input { channel, text } => {
                        self.dispatch_input(&channel, &text).await;
                    }
                    SessionEvent::Closed => break,
                },
                _ = self.stop_token.cancelled() => {
                    self.session.request_exit();
                    break;
                }
            }
        }

        self.phase = Phase::Stopped;
        self.publisher.shutdown();
        debug!("bridge stopped");
    }

    /// Requests termination from outside the run loop. Idempotent.
    pub fn stop(&mut self) {
        self.stop_token.cancel();
        self.session.request_exit();
        if self.phase != Phase::Running {
            self.phase = Phase::Stopped;
            self.publisher.shutdown();
        }
    }

    fn render_inbound(&mut self, event: InboundEvent) {
        let line = render_event_line(&event.payload);
        if self.is_configured(&event.stream) {
            self.session.display_message(&event.stream, &line);
        } else {
            // Streams this bridge never subscribed to have no channel of
            // their own; surface the event instead of dropping it.
            self.session.display_message(SYSTEM_CHANNEL, &line);
        }
        for (filter, observer) in &self.observers {
            if filter.as_deref().map_or(true, |name| name == event.stream) {
                observer(&event);
            }
        }
    }

    async fn dispatch_input(&mut self, channel: &str, text: &str) -> Option<PublishTicket> {
        match commands::process_input(text) {
            CommandResult::ProcessAsMessage(message) => {
                self.session.display_message(
                    SYSTEM_CHANNEL,
                    &format!("sending to {channel}: {message}"),
                );
                if self.is_configured(channel) {
                    Some(self.publisher.enqueue(channel, Payload::Text(message)).await)
                } else {
                    None
                }
            }
            CommandResult::ShowLines(lines) => {
                for line in &lines {
                    self.session.display_message(SYSTEM_CHANNEL, line);
                }
                None
            }
            CommandResult::Publish(payload) => {
                if self.is_configured(channel) {
                    Some(self.publisher.enqueue(channel, payload).await)
                } else {
                    debug!(channel = %channel, "dropping publish for non-stream channel");
                    None
                }
            }
            CommandResult::Quit => {
                debug!("quit command received");
                self.session.request_exit();
                None
            }
        }
    }

    fn is_configured(&self, name: &str) -> bool {
        self.streams.iter().any(|stream| stream == name)
    }
}

/// Renders one delivered event as a scrollback line: text passes through
/// verbatim, structured payloads become re-entrant `/obj` command lines.
fn render_event_line(payload: &Payload) -> String {
    match payload {
        Payload::Text(text) => text.clone(),
        Payload::Object(value) => format!("/obj {value}"),
    }
}
