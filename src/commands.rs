// Command handlers: the UI event surface mapped onto the orchestrator

use crate::models::Severity;
use crate::state::AppState;
use crate::task::TaskHandle;
use std::str::FromStr;
use strum::{Display, EnumString};

/// Action cards on the landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ActionKind {
    Location,
    Profit,
    Trends,
    Partner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenChat,
    CloseChat,
    ToggleChat { force_open: bool },
    /// Send button or Enter in the chat input
    SendMessage(String),
    ShowLocationPrompt,
    HideLocationPrompt,
    /// User consented to location access
    AllowLocation,
    /// Raw action identifier from an action card; unknown ones are ignored
    Action(String),
    StartAnalysis,
    ChangeLanguage(String),
    /// Escape key
    Escape,
}

const PROFIT_NOTICE: &str = "🧮 Profit Simulator coming soon! This will help you calculate potential earnings.";
const PROFIT_PROMPT: &str = "🧮 Profit Simulator activated! Let me help you calculate potential earnings.\n\nPlease provide:\n• Product type\n• Expected daily customers\n• Price per item\n• Operating hours\n\nI'll calculate your profit potential!";
const PARTNER_NOTICE: &str = "🤝 Partner Matching feature coming soon! Connect with other vendors for collaboration.";
const PARTNER_PROMPT: &str = "🤝 Partner Matching activated! I can help you find:\n\n👥 Vendors with complementary products\n🏪 Location partners (space sharing)\n🚚 Supply chain partners\n💼 Investment partners\n\nWhat type of partnership are you looking for?";
const TRENDS_NOTICE: &str = "📈 Check out the live trends below!";

const MARKET_INSIGHTS: [&str; 5] = [
    "📊 Current market shows 23% growth in street food sector",
    "🏆 Top performing categories: Beverages (35%), Snacks (28%), Accessories (18%)",
    "⏰ Peak hours: 8-10 AM, 12-2 PM, 6-8 PM",
    "📍 High-traffic areas have 60% higher profit margins",
    "🌟 Customer retention increases 40% with consistent quality",
];

/// Runs a command. Work that outlives the call (a reply, a location run, a
/// delayed analysis) comes back as a handle; dropping it does not cancel.
pub async fn dispatch(state: &AppState, command: Command) -> Option<TaskHandle> {
    log::debug!("Dispatching {:?}", command);
    match command {
        Command::OpenChat => {
            state.chat.open();
            None
        }
        Command::CloseChat => {
            state.chat.close();
            None
        }
        Command::ToggleChat { force_open } => {
            state.chat.toggle(force_open);
            None
        }
        Command::SendMessage(content) => send_message(state, &content),
        Command::ShowLocationPrompt => {
            state.location.show_prompt();
            None
        }
        Command::HideLocationPrompt => {
            state.location.hide_prompt();
            None
        }
        Command::AllowLocation => Some(allow_location(state)),
        Command::Action(action) => handle_action(state, &action).await,
        Command::StartAnalysis => Some(start_analysis(state)),
        Command::ChangeLanguage(code) => {
            change_language(state, &code);
            None
        }
        Command::Escape => {
            state.location.hide_prompt();
            state.chat.close();
            None
        }
    }
}

pub fn send_message(state: &AppState, content: &str) -> Option<TaskHandle> {
    match state.chat.send_user_message(content) {
        Ok(reply) => Some(TaskHandle::spawn(async move {
            reply.wait().await;
        })),
        Err(e) => {
            // Blank input is a silent no-op
            log::debug!("Message not sent: {}", e);
            None
        }
    }
}

pub fn allow_location(state: &AppState) -> TaskHandle {
    log::info!("Location access granted by user");
    let flow = state.location.clone();
    TaskHandle::spawn(async move {
        let outcome = flow.detect().await;
        log::debug!("Location run finished in {:?}", outcome);
    })
}

pub async fn handle_action(state: &AppState, action: &str) -> Option<TaskHandle> {
    let Ok(kind) = ActionKind::from_str(action) else {
        log::debug!("Ignoring unknown action '{}'", action);
        return None;
    };
    log::info!("Action card selected: {}", kind);
    match kind {
        ActionKind::Location => state.location.show_prompt(),
        ActionKind::Profit => open_profit_simulator(state).await,
        ActionKind::Trends => show_trends_analysis(state),
        ActionKind::Partner => open_partner_matching(state).await,
    }
    None
}

async fn open_profit_simulator(state: &AppState) {
    state.notifications.enqueue(PROFIT_NOTICE, Severity::Info);
    state.chat.inject_bot_message(PROFIT_PROMPT).await;
    state.chat.toggle(true);
}

fn show_trends_analysis(state: &AppState) {
    state.renderer.focus_trends();
    state.notifications.enqueue(TRENDS_NOTICE, Severity::Info);
}

async fn open_partner_matching(state: &AppState) {
    state.notifications.enqueue(PARTNER_NOTICE, Severity::Info);
    state.chat.inject_bot_message(PARTNER_PROMPT).await;
    state.chat.toggle(true);
}

pub fn market_analysis() -> String {
    MARKET_INSIGHTS.join("\n")
}

pub fn start_analysis(state: &AppState) -> TaskHandle {
    state.notifications.enqueue("🔍 Starting AI analysis...", Severity::Info);
    let chat = state.chat.clone();
    let delay = state.analysis_delay;
    TaskHandle::spawn(async move {
        tokio::time::sleep(delay).await;
        chat.inject_bot_message(format!(
            "🔍 Market Analysis Complete!\n\n{}\n\nWould you like me to dive deeper into any of these insights?",
            market_analysis()
        ))
        .await;
        chat.toggle(true);
    })
}

pub fn language_name(code: &str) -> &'static str {
    match code {
        "en" => "English",
        "hi" => "Hindi",
        "kn" => "Kannada",
        "ta" => "Tamil",
        _ => "English",
    }
}

pub fn change_language(state: &AppState, code: &str) {
    log::info!("Language changed to: {}", code);
    state.notifications.enqueue(
        format!("🌐 Language changed to {}", language_name(code)),
        Severity::Success,
    );
}
