//! hubchat - ask a hosted knowledge-base assistant questions from the terminal

mod commands;
mod config;
mod plain;
mod ui;

use clap::Parser;
use hubchat_ai::AssistantsClient;
use hubchat_relay::ChatRelay;
use hubchat_tui::Theme;
use std::sync::Arc;

/// hubchat - chat with a knowledge-base assistant
#[derive(Parser, Debug)]
#[command(name = "hubchat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Assistant id (default: assistant_id in config, then ASSISTANT_ID)
    #[arg(short, long)]
    assistant: Option<String>,

    /// API base URL (default: https://api.openai.com/v1)
    #[arg(long)]
    base_url: Option<String>,

    /// Ask a single question, print the reply and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long)]
    verbose: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("hubchat=debug,hubchat_ai=debug,hubchat_relay=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    let Some(api_key) = cfg.api_key() else {
        eprintln!("Error: No OpenAI API key found");
        eprintln!();
        eprintln!("Set your API key with: export OPENAI_API_KEY=your-key");
        eprintln!("Or add it to config file: hubchat --init-config");
        std::process::exit(1);
    };

    let Some(assistant_id) = cfg.assistant_id(args.assistant) else {
        eprintln!("Error: No assistant id configured");
        eprintln!();
        eprintln!("Pass one with: hubchat --assistant asst_...");
        eprintln!("Or set it with: export ASSISTANT_ID=asst_...");
        eprintln!("Or add it to config file: hubchat --init-config");
        std::process::exit(1);
    };

    let mut client = AssistantsClient::new(api_key, assistant_id);
    if let Some(base_url) = cfg.base_url(args.base_url) {
        client = client.with_base_url(base_url);
    }

    // A bad key or unknown assistant is fatal before any chat starts
    let assistant = match client.retrieve_assistant().await {
        Ok(assistant) => assistant,
        Err(e) => {
            eprintln!(
                "Error: Could not load assistant {}: {}",
                client.assistant_id(),
                e
            );
            if e.is_auth_error() {
                eprintln!("Check that your OpenAI API key is valid.");
            }
            std::process::exit(1);
        }
    };
    tracing::debug!(
        assistant = %assistant.id,
        name = assistant.display_name(),
        "assistant loaded"
    );

    let mut relay = ChatRelay::new(Arc::new(client));

    // Non-interactive mode
    if let Some(command) = args.command {
        return plain::run_command(&mut relay, &command).await;
    }

    if !args.no_tui && cfg.tui.unwrap_or(true) {
        let theme = Theme::by_name(cfg.theme.as_deref().unwrap_or("dark"));
        return ui::run_tui(&mut relay, &assistant, &cfg, theme).await;
    }

    plain::run_interactive(&mut relay, &assistant, &cfg).await
}
