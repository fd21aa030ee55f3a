use crate::commands::Command;
use crate::state::AppState;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

pub const HELP: &str = "\
Commands:
  /open, /close, /toggle   show or hide the chat
  /location                ask for location access
  /allow, /cancel          answer the location prompt
  /action <id>             location | profit | trends | partner
  /analyze                 run the market analysis
  /lang <code>             en | hi | kn | ta
  /esc                     close prompt and chat
  /quit                    exit
Anything else is sent to the assistant.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Help,
    Quit,
    Unknown(String),
}

// Anything that is not a slash command is chat input (Enter)
pub fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return Input::Command(Command::SendMessage(trimmed.to_string()));
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default().to_string();

    match name {
        "/open" => Input::Command(Command::OpenChat),
        "/close" => Input::Command(Command::CloseChat),
        "/toggle" => Input::Command(Command::ToggleChat { force_open: false }),
        "/location" => Input::Command(Command::ShowLocationPrompt),
        "/allow" => Input::Command(Command::AllowLocation),
        "/cancel" => Input::Command(Command::HideLocationPrompt),
        "/action" => Input::Command(Command::Action(arg)),
        "/analyze" => Input::Command(Command::StartAnalysis),
        "/lang" => Input::Command(Command::ChangeLanguage(arg)),
        "/esc" => Input::Command(Command::Escape),
        "/help" => Input::Help,
        "/quit" | "/exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

pub async fn run_console(state: &AppState) -> Result<()> {
    println!("🚀 VendorAI ready. Type /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        match parse_line(&line) {
            Input::Command(command) => {
                // Background work keeps running; the handle is not needed here
                let _ = state.dispatch(command).await;
            }
            Input::Help => println!("{}", HELP),
            Input::Quit => break,
            Input::Unknown(name) => println!("Unknown command {}. Type /help.", name),
        }
    }
    Ok(())
}
