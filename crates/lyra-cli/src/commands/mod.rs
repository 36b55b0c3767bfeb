//! Slash commands for interactive mode

use lyra_agent::{AppSettings, OptimizationMode, TargetAi};

/// Result of executing a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Clear the conversation
    Clear,
    /// Change the target platform
    SetTarget(TargetAi),
    /// Change the optimization mode
    SetMode(OptimizationMode),
    /// Show the current settings (toggles the panel in the TUI)
    ShowSettings,
    /// Show a message to the user (not sent to the model)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, settings: AppSettings) -> Option<CommandResult> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("").to_lowercase();
    let args = parts.next().map(str::trim).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "clear" | "c" => CommandResult::Clear,

        "quit" | "exit" | "q" => CommandResult::Exit,

        "settings" | "s" => CommandResult::ShowSettings,

        "target" | "t" => {
            if args.is_empty() {
                CommandResult::Message(target_list(settings.target_ai))
            } else {
                match args.parse::<TargetAi>() {
                    Ok(target) => CommandResult::SetTarget(target),
                    Err(e) => CommandResult::Message(e),
                }
            }
        }

        "mode" | "m" => {
            if args.is_empty() {
                CommandResult::SetMode(settings.mode.toggled())
            } else {
                match args.parse::<OptimizationMode>() {
                    Ok(mode) => CommandResult::SetMode(mode),
                    Err(e) => CommandResult::Message(e),
                }
            }
        }

        _ => CommandResult::Unknown(command),
    })
}

/// Describe the active settings
pub fn settings_text(settings: AppSettings) -> String {
    format!(
        "Target Platform: {}\nOptimization Mode: {} ({})",
        settings.target_ai.label(),
        settings.mode.title(),
        settings.mode.description()
    )
}

fn target_list(current: TargetAi) -> String {
    let mut text = String::from("Target platforms:\n");
    for target in TargetAi::ALL {
        let marker = if target == current { "●" } else { " " };
        text.push_str(&format!("  {} {}\n", marker, target.label()));
    }
    text.push_str("\nUse /target <name> to switch.");
    text
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?          Show this help message
  /target, /t [name]     List platforms or set one (chatgpt, claude, gemini, other)
  /mode, /m [mode]       Toggle or set the mode (basic, detail)
  /settings, /s          Show the current settings
  /clear, /c             Start a fresh conversation
  /quit, /exit, /q       Exit lyra

Keys (TUI):
  Enter                  Send
  Shift+Enter, Alt+Enter Insert a new line
  Ctrl+T / Ctrl+O        Cycle target / toggle mode
  Ctrl+S                 Show or hide the settings panel
  Ctrl+Y                 Copy the latest reply
  PgUp / PgDn            Scroll the conversation
  Esc                    Dismiss the error banner"#
        .to_string()
}
