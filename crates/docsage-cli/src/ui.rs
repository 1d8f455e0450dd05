//! UI utilities for the chat loop

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use docsage_core::Result;
use std::io::{self, IsTerminal, Write};

const PROMPT: &str = "docsage>";

/// Display startup banner
pub fn display_banner(session_id: &str, expansion: bool) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = terminal_width.saturating_sub(4).clamp(40, 67);
    let inner = banner_width - 2;

    let line = |text: &str| {
        let padding = inner.saturating_sub(text.chars().count() + 2);
        format!("│  {}{}│", text, " ".repeat(padding))
    };

    println!();
    println!("{}", format!("┌{}┐", "─".repeat(inner)).blue());
    println!("{}", line("DocSage - Handbook Q&A").blue().bold());
    println!("{}", line("").blue());
    println!("{}", line("Answers grounded in indexed documentation,").blue());
    println!("{}", line("with cited sources and a confidence level.").blue());
    println!("{}", format!("└{}┘", "─".repeat(inner)).blue());
    println!(
        "{}",
        format!(
            "Session {} | query expansion {} | /help for commands",
            session_id,
            if expansion { "on" } else { "off" }
        )
        .dimmed()
    );
    println!();
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask a question about the documentation", "<question>".green());
    println!("  {} - Toggle query expansion", "/expand".green());
    println!("  {} - Forget this session's conversation", "/clear".green());
    println!("  {} - Start a new session", "/new".green());
    println!("  {} - Show pipeline statistics", "/stats".green());
    println!("  {} - Show this help message", "/help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  What is GitLab's mission?");
    println!("  How does the company approach remote work?");
}

/// Read one line, with ↑/↓ history navigation when attached to a terminal.
///
/// Returns `None` at end of piped input, on Ctrl+C, or on Ctrl+D at an empty
/// line. Esc discards the current line.
pub fn read_line_with_history(history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        return Ok(Some(input.trim().to_string()));
    }

    enable_raw_mode()?;
    let outcome = edit_line(history);
    disable_raw_mode()?;
    println!();

    let Some(input) = outcome? else {
        return Ok(None);
    };
    if !input.trim().is_empty() {
        history.push(input.clone());
    }
    Ok(Some(input))
}

/// Ctrl+C always ends the session; Ctrl+D only on an empty line
fn is_end_of_session(key_event: &KeyEvent, input: &str) -> bool {
    if !key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }
    match key_event.code {
        KeyCode::Char('c') => true,
        KeyCode::Char('d') => input.is_empty(),
        _ => false,
    }
}

fn edit_line(history: &[String]) -> Result<Option<String>> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;
    redraw(&input, 0)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        if is_end_of_session(&key_event, &input) {
            return Ok(None);
        }

        let previous_len = input.chars().count();
        match key_event.code {
            KeyCode::Enter => return Ok(Some(input)),
            KeyCode::Esc => return Ok(Some(String::new())),
            KeyCode::Char(_) if key_event.modifiers.contains(KeyModifiers::CONTROL) => continue,
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Up if !history.is_empty() => {
                let index = match history_index {
                    None => history.len() - 1,
                    Some(index) => index.saturating_sub(1),
                };
                history_index = Some(index);
                input = history[index].clone();
            }
            KeyCode::Down => match history_index {
                Some(index) if index + 1 < history.len() => {
                    history_index = Some(index + 1);
                    input = history[index + 1].clone();
                }
                Some(_) => {
                    history_index = None;
                    input.clear();
                }
                None => {}
            },
            _ => continue,
        }
        redraw(&input, previous_len)?;
    }
}

fn redraw(input: &str, previous_len: usize) -> Result<()> {
    let stale = previous_len.saturating_sub(input.chars().count());
    print!(
        "\r{} {}{}\r{} {}",
        PROMPT.green().bold(),
        input,
        " ".repeat(stale),
        PROMPT.green().bold(),
        input
    );
    io::stdout().flush()?;
    Ok(())
}
