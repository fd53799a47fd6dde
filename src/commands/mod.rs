//! Slash-command dispatch for submitted input lines.
//!
//! Lines are matched against the static registry; anything that is not a
//! recognized command is forwarded to the current channel's stream as a
//! chat message.

mod registry;

pub use registry::{all_commands, find_command, Command, CommandInvocation};

use serde_json::Value;

use crate::transport::Payload;

/// Outcome of dispatching one submitted input line.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Not a recognized command; forward to the current channel's stream.
    ProcessAsMessage(String),
    /// Write these lines to the system channel.
    ShowLines(Vec<String>),
    /// Publish this payload to the current channel's stream.
    Publish(Payload),
    /// End the session.
    Quit,
}

pub fn process_input(input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(trimmed.to_string());
    }

    let mut parts = trimmed.splitn(2, ' ');
    let token = parts.next().unwrap_or(trimmed);
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(token) {
        let invocation = CommandInvocation {
            input: trimmed,
            args,
        };
        (command.handler)(invocation)
    } else {
        CommandResult::ProcessAsMessage(trimmed.to_string())
    }
}

pub(super) fn handle_help(_invocation: CommandInvocation<'_>) -> CommandResult {
    let mut lines = vec!["Available commands:".to_string()];
    for command in all_commands() {
        lines.push(command.name.to_string());
    }
    CommandResult::ShowLines(lines)
}

pub(super) fn handle_obj(invocation: CommandInvocation<'_>) -> CommandResult {
    match serde_json::from_str::<Value>(invocation.args) {
        Ok(value) => CommandResult::Publish(Payload::Object(value)),
        Err(_) => CommandResult::ShowLines(vec![format!(
            "Invalid JSON: {}",
            invocation.args
        )]),
    }
}

pub(super) fn handle_quit(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}
