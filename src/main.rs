mod demo;
mod logging;

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::sync::Arc;
use tracing::info;

use docsage_cli::{
    ChatCommand, display_banner, parse_command, print_help, read_line_with_history,
    render_result, render_stats,
};
use docsage_core::{QueryRequest, RagConfig, VectorIndex};
use docsage_gemini::GeminiClient;
use docsage_rag::{ConversationMemory, QdrantConfig, QdrantVectorIndex, RagService};

#[derive(Parser)]
#[command(name = "docsage")]
#[command(about = "Grounded question answering over indexed documentation", long_about = None)]
struct Cli {
    /// Ask a single question and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Conversation session id; a new one is generated when omitted
    #[arg(short, long)]
    session: Option<String>,

    /// Rewrite questions into several search phrasings before retrieval
    #[arg(short, long)]
    expand: bool,

    /// Answer from a built-in sample corpus instead of Qdrant
    #[arg(long)]
    demo: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.log_json);

    let mut config = RagConfig::from_env()?;
    let gemini = Arc::new(GeminiClient::from_env()?);

    let index: Arc<dyn VectorIndex> = if cli.demo {
        config.similarity_threshold = config
            .similarity_threshold
            .min(demo::DEMO_SIMILARITY_THRESHOLD);
        Arc::new(demo::sample_index())
    } else {
        Arc::new(QdrantVectorIndex::new(&QdrantConfig::from_env(), gemini.clone())?)
    };
    let rag = RagService::new(index, gemini, config);

    // One-shot mode
    if let Some(query) = cli.query {
        let mut request = QueryRequest::new(query).with_expansion(cli.expand);
        if let Some(session_id) = cli.session {
            request = request.with_session(session_id);
        }
        match rag.process_query(&request).await {
            Ok(result) => println!("{}", render_result(&result)),
            Err(e) => {
                eprintln!("{} {}", "✗".red(), e.user_message());
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Interactive mode
    let mut session_id = cli
        .session
        .unwrap_or_else(ConversationMemory::new_session_id);
    let mut expansion = cli.expand;
    display_banner(&session_id, expansion);

    let mut history = Vec::new();
    while let Some(line) = read_line_with_history(&mut history)? {
        match parse_command(&line) {
            ChatCommand::Empty => continue,
            ChatCommand::Exit => break,
            ChatCommand::Help => print_help(),
            ChatCommand::ToggleExpansion => {
                expansion = !expansion;
                println!(
                    "{} Query expansion {}",
                    "⚙".cyan(),
                    if expansion { "on" } else { "off" }
                );
            }
            ChatCommand::ClearSession => {
                rag.clear_session(&session_id);
                println!("{} Conversation cleared", "✓".green());
            }
            ChatCommand::NewSession => {
                session_id = ConversationMemory::new_session_id();
                println!("{} Started session {}", "✓".green(), session_id);
            }
            ChatCommand::Stats => match rag.stats().await {
                Ok(stats) => println!("{}", render_stats(&stats)),
                Err(e) => eprintln!("{} {}", "✗".red(), e.user_message()),
            },
            ChatCommand::Unknown(command) => {
                println!("{} Unknown command {}; type /help", "?".yellow(), command);
            }
            ChatCommand::Ask(question) => {
                println!("{}", "Searching the documentation...".dimmed());
                let request = QueryRequest::new(question)
                    .with_session(session_id.clone())
                    .with_expansion(expansion);
                match rag.process_query(&request).await {
                    Ok(result) => println!("\n{}\n", render_result(&result)),
                    Err(e) => eprintln!("{} {}", "✗".red(), e.user_message()),
                }
            }
        }
    }

    info!(session_id = %session_id, "chat ended");
    println!("{}", "Goodbye!".green());
    Ok(())
}
