use super::CommandResult;

pub type CommandHandler = fn(CommandInvocation<'_>) -> CommandResult;

/// A built-in command recognized by exact token match on the first word of
/// an input line.
pub struct Command {
    pub name: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(token: &str) -> Option<&'static Command> {
    all_commands().iter().find(|command| command.name == token)
}

const COMMANDS: &[Command] = &[
    Command {
        name: "/help",
        handler: super::handle_help,
    },
    Command {
        name: "/obj",
        handler: super::handle_obj,
    },
    Command {
        name: "/quit",
        handler: super::handle_quit,
    },
];
