use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::session::{ChatSession, SessionEvent};
use crate::transport::{InboundEvent, Payload, StreamTransport};

/// Transport double that records subscriptions and publishes and can inject
/// registration or publish failures.
#[derive(Default)]
pub struct RecordingTransport {
    state: Mutex<RecordingState>,
}

#[derive(Default)]
struct RecordingState {
    subscriptions: Vec<(String, mpsc::UnboundedSender<InboundEvent>)>,
    publishes: Vec<(String, Payload)>,
    fail_subscribe: bool,
    publish_error: Option<String>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_subscriptions(&self) {
        self.state.lock().unwrap().fail_subscribe = true;
    }

    pub fn fail_publishes(&self, message: &str) {
        self.state.lock().unwrap().publish_error = Some(message.to_string());
    }

    pub fn subscribed_streams(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn publishes(&self) -> Vec<(String, Payload)> {
        self.state.lock().unwrap().publishes.clone()
    }

    /// Pushes an event through every subscription registered for `stream`.
    pub fn deliver(&self, stream: &str, payload: Payload) {
        let state = self.state.lock().unwrap();
        for (name, sender) in &state.subscriptions {
            if name == stream {
                let _ = sender.send(InboundEvent {
                    stream: stream.to_string(),
                    payload: payload.clone(),
                });
            }
        }
    }
}

#[async_trait]
impl StreamTransport for RecordingTransport {
    fn subscribe(
        &self,
        stream: &str,
        events: mpsc::UnboundedSender<InboundEvent>,
    ) -> Result<(), String> {
        let mut state = self.state.lock().unwrap();
        if state.fail_subscribe {
            return Err("subscription rejected".to_string());
        }
        state.subscriptions.push((stream.to_string(), events));
        Ok(())
    }

    async fn publish(&self, stream: &str, payload: Payload) -> Result<(), String> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = &state.publish_error {
            return Err(error.clone());
        }
        state.publishes.push((stream.to_string(), payload));
        Ok(())
    }
}

/// Session double fed a fixed input script; everything displayed is captured
/// in a shared [`SessionLog`] the test keeps a handle to.
pub struct ScriptedSession {
    inputs: VecDeque<SessionEvent>,
    log: SessionLog,
}

#[derive(Clone, Default)]
pub struct SessionLog {
    inner: Arc<Mutex<SessionLogState>>,
}

#[derive(Default)]
struct SessionLogState {
    channels: Vec<String>,
    messages: Vec<(String, String)>,
    exit_requested: bool,
    fail_add_channel: bool,
}

impl SessionLog {
    pub fn channels(&self) -> Vec<String> {
        self.inner.lock().unwrap().channels.clone()
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().messages.clone()
    }

    pub fn exit_requested(&self) -> bool {
        self.inner.lock().unwrap().exit_requested
    }

    pub fn fail_add_channel(&self) {
        self.inner.lock().unwrap().fail_add_channel = true;
    }
}

impl ScriptedSession {
    pub fn with_inputs(inputs: &[(&str, &str)]) -> (Self, SessionLog) {
        let log = SessionLog::default();
        let session = ScriptedSession {
            inputs: inputs
                .iter()
                .map(|(channel, text)| SessionEvent::Input {
                    channel: channel.to_string(),
                    text: text.to_string(),
                })
                .collect(),
            log: log.clone(),
        };
        (session, log)
    }
}

#[async_trait]
impl ChatSession for ScriptedSession {
    fn add_channel(&mut self, name: &str) -> Result<(), String> {
        let mut state = self.log.inner.lock().unwrap();
        if state.fail_add_channel {
            return Err("channel rejected".to_string());
        }
        state.channels.push(name.to_string());
        Ok(())
    }

    fn display_message(&mut self, channel: &str, text: &str) {
        self.log
            .inner
            .lock()
            .unwrap()
            .messages
            .push((channel.to_string(), text.to_string()));
    }

    async fn next_event(&mut self) -> SessionEvent {
        if self.log.exit_requested() {
            return SessionEvent::Closed;
        }
        if let Some(event) = self.inputs.pop_front() {
            return event;
        }
        std::future::pending::<SessionEvent>().await
    }

    fn request_exit(&mut self) {
        self.log.inner.lock().unwrap().exit_requested = true;
    }
}
