//! lyra - prompt optimization chat client

mod commands;
mod config;
mod ui;

use clap::Parser;
use lyra_agent::{
    AppSettings, ChatEvent, InteractionController, OptimizationMode, Rejection, SubmitOutcome,
    TargetAi,
    prompts::{SYSTEM_INSTRUCTION, WELCOME_MESSAGE},
};
use lyra_ai::{ChatConfig, DEFAULT_MODEL, providers::google::GoogleProvider};
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::EnvFilter;

use crate::commands::{CommandResult, execute_command, settings_text};

/// lyra - turns rough prompts into optimized ones
#[derive(Parser, Debug)]
#[command(name = "lyra")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target platform (chatgpt, claude, gemini, other)
    #[arg(short, long)]
    target: Option<TargetAi>,

    /// Optimization mode (basic, detail)
    #[arg(short = 'm', long)]
    mode: Option<OptimizationMode>,

    /// Gemini model to use (default: gemini-2.5-flash)
    #[arg(long)]
    model: Option<String>,

    /// Optimize a single prompt and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Verbose output
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

    // Setup tracing; stderr keeps stdout clean for replies
    if args.verbose {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lyra=debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
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

    // Merge config with CLI args (CLI takes precedence)
    let settings = AppSettings {
        target_ai: args.target.or(cfg.target).unwrap_or_default(),
        mode: args.mode.or(cfg.mode).unwrap_or_default(),
    };
    let model_id = args
        .model
        .or(cfg.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let use_tui = !args.no_tui && cfg.tui.unwrap_or(true) && io::stdout().is_terminal();

    // A missing key is reported in the conversation, not at startup
    let api_key = cfg.api_key();
    tracing::debug!(
        model = %model_id,
        target_ai = %settings.target_ai,
        mode = %settings.mode,
        has_key = api_key.is_some(),
        "starting lyra"
    );

    let chat_config = ChatConfig::with_system(SYSTEM_INSTRUCTION).model(&model_id);
    let controller = InteractionController::new(Arc::new(GoogleProvider::new()), chat_config)
        .with_credential(api_key)
        .with_settings(settings);

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(&controller, &command).await;
    }

    let controller = Arc::new(controller.with_welcome(WELCOME_MESSAGE));

    if use_tui {
        return ui::run_tui(controller, &model_id).await;
    }

    run_interactive(&controller, &model_id).await
}

/// Submit `text` and print the reply as it streams in
async fn submit_and_print(controller: &InteractionController, text: &str) -> SubmitOutcome {
    let mut receiver = controller.subscribe();

    let printer = tokio::spawn(async move {
        let mut out = io::stdout();
        print_reply(&mut receiver, &mut out).await;
    });

    let outcome = controller.submit(text).await;
    match outcome {
        // Every event is already queued; let the printer drain them
        SubmitOutcome::Completed { .. } | SubmitOutcome::Failed => {
            let _ = printer.await;
        }
        SubmitOutcome::Rejected(_) => printer.abort(),
    }
    outcome
}

/// Write reply deltas to `out` until the exchange ends.
///
/// Returns whether any events were missed because the receiver lagged; in
/// that case the finished reply is printed again in full.
async fn print_reply(receiver: &mut broadcast::Receiver<ChatEvent>, out: &mut impl Write) -> bool {
    let mut lagged = false;
    loop {
        match receiver.recv().await {
            Ok(ChatEvent::ReplyDelta { delta, .. }) => {
                let _ = write!(out, "{}", delta);
                let _ = out.flush();
            }
            Ok(ChatEvent::ReplyFinished { message }) if lagged => {
                let _ = writeln!(out, "\n\n{}", message.text);
                break;
            }
            Ok(event) if event.is_terminal() => {
                let _ = writeln!(out);
                break;
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "reply printer lagged behind");
                lagged = true;
            }
            Err(RecvError::Closed) => break,
        }
    }
    lagged
}

async fn run_command(controller: &InteractionController, command: &str) -> anyhow::Result<()> {
    match submit_and_print(controller, command).await {
        SubmitOutcome::Completed { .. } => Ok(()),
        SubmitOutcome::Rejected(Rejection::Blank) => anyhow::bail!("Nothing to optimize."),
        SubmitOutcome::Rejected(Rejection::Busy) => anyhow::bail!("An exchange is already running."),
        SubmitOutcome::Rejected(Rejection::MissingCredential) | SubmitOutcome::Failed => {
            let message = controller
                .banner()
                .unwrap_or_else(|| "Failed to generate response.".to_string());
            anyhow::bail!(message)
        }
    }
}

async fn run_interactive(controller: &InteractionController, model_id: &str) -> anyhow::Result<()> {
    // Show startup info (only if TTY)
    if io::stderr().is_terminal() {
        eprintln!("lyra ({})", model_id);
        eprintln!("{}", settings_text(controller.settings()));
        eprintln!();
    }

    for message in controller.snapshot().messages {
        println!("{}\n", message.text);
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        if let Some(result) = execute_command(input, controller.settings()) {
            match result {
                CommandResult::Clear => match controller.clear() {
                    Ok(()) => println!("Cleared conversation."),
                    Err(_) => println!("Wait for the current reply to finish before clearing."),
                },
                CommandResult::SetTarget(target) => {
                    controller.set_target(target);
                    println!("Target platform: {}", target.label());
                }
                CommandResult::SetMode(mode) => {
                    controller.set_mode(mode);
                    println!("{}", mode.footer());
                }
                CommandResult::ShowSettings => println!("{}", settings_text(controller.settings())),
                CommandResult::Message(msg) => println!("{}", msg),
                CommandResult::Exit => break,
                CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            continue;
        }

        println!();
        match submit_and_print(controller, input).await {
            SubmitOutcome::Completed { .. } => println!(),
            SubmitOutcome::Rejected(_) | SubmitOutcome::Failed => {
                if let Some(banner) = controller.banner() {
                    eprintln!("Error: {}", banner);
                    controller.dismiss_error();
                }
            }
        }
    }

    Ok(())
}
