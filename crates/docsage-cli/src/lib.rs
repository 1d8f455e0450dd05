//! Terminal interface for DocSage

mod command;
mod render;
mod ui;

#[cfg(test)]
mod tests;

pub use command::{ChatCommand, parse_command};
pub use render::{confidence_label, display_locator, format_relevance, render_result, render_stats};
pub use ui::{display_banner, print_help, read_line_with_history};

// Re-export core types
pub use docsage_core::{Error, Result};
