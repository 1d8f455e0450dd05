//! Chat input parsing

/// One line of chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// A question for the pipeline
    Ask(String),
    ToggleExpansion,
    ClearSession,
    NewSession,
    Stats,
    Help,
    Exit,
    Unknown(String),
    Empty,
}

/// Classify a line typed at the chat prompt.
///
/// Slash commands are case-insensitive; `exit` and `quit` work with or without
/// a leading slash. Anything else is a question.
pub fn parse_command(line: &str) -> ChatCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatCommand::Empty;
    }

    let lowered = trimmed.to_lowercase();
    match lowered.as_str() {
        "exit" | "quit" | "/exit" | "/quit" => ChatCommand::Exit,
        "help" | "/help" => ChatCommand::Help,
        "/expand" => ChatCommand::ToggleExpansion,
        "/clear" => ChatCommand::ClearSession,
        "/new" => ChatCommand::NewSession,
        "/stats" => ChatCommand::Stats,
        other if other.starts_with('/') => ChatCommand::Unknown(trimmed.to_string()),
        _ => ChatCommand::Ask(trimmed.to_string()),
    }
}
