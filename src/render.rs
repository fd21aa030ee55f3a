use crate::models::{ChatMessage, Notification, Sender, Trend};
use crate::trends::format_relative_age;
use chrono::Utc;
use serde::Serialize;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPhase {
    Entering,
    Visible,
    Leaving,
}

// Status line kinds for the location prompt
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

pub trait Renderer: Send + Sync {
    fn render_trends(&self, trends: &[Trend]);
    fn render_history(&self, history: &[ChatMessage]);
    fn set_typing(&self, active: bool);
    fn set_chat_visible(&self, visible: bool);
    fn set_location_prompt_visible(&self, visible: bool);
    fn set_location_status(&self, kind: StatusKind, message: &str);
    fn show_notification(&self, notification: &Notification, phase: NotificationPhase);
    fn remove_notification(&self, id: Uuid);

    fn clear_input(&self) {}
    fn scroll_history(&self) {}
    fn focus_trends(&self) {}
}

// --- Console renderer (used by the binary) ---

// History is printed incrementally, only messages not shown yet
#[derive(Default)]
pub struct ConsoleRenderer {
    printed: Mutex<usize>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for ConsoleRenderer {
    fn render_trends(&self, trends: &[Trend]) {
        let now = Utc::now();
        println!("---- Live trends ----");
        for trend in trends {
            let hot = if trend.is_hot { " 🔥 HOT" } else { "" };
            println!("[{}]{} {}", trend.category, hot, trend.title);
            println!("    {}", trend.description);
            println!("    {} · {}", trend.impact, format_relative_age(trend.timestamp, now));
        }
    }

    fn render_history(&self, history: &[ChatMessage]) {
        let mut printed = self.printed.lock().unwrap_or_else(|p| p.into_inner());
        for msg in history.iter().skip(*printed) {
            let who = match msg.sender {
                Sender::User => "you",
                Sender::Bot => "bot",
            };
            println!("{}> {}", who, msg.text);
        }
        *printed = history.len();
    }

    fn set_typing(&self, active: bool) {
        if active {
            println!("bot is typing...");
        }
    }

    fn set_chat_visible(&self, visible: bool) {
        println!("(chat {})", if visible { "opened" } else { "closed" });
    }

    fn set_location_prompt_visible(&self, visible: bool) {
        if visible {
            println!("(location) Allow VendorAI to use your location? Type /allow or /cancel");
        }
    }

    fn set_location_status(&self, _kind: StatusKind, message: &str) {
        println!("(location) {}", message);
    }

    fn show_notification(&self, notification: &Notification, phase: NotificationPhase) {
        if phase == NotificationPhase::Entering {
            println!("[{}] {}", notification.severity, notification.message);
        }
    }

    fn remove_notification(&self, _id: Uuid) {}
}

// --- Recording renderer (headless runs and tests) ---

#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
    Trends(Vec<Trend>),
    History(Vec<ChatMessage>),
    Typing(bool),
    ChatVisible(bool),
    LocationPrompt(bool),
    LocationStatus(StatusKind, String),
    Notification(Uuid, NotificationPhase, String),
    NotificationRemoved(Uuid),
    InputCleared,
    HistoryScrolled,
    TrendsFocused,
}

#[derive(Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<RenderEvent>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn push(&self, event: RenderEvent) {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).push(event);
    }

    pub fn notification_messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Notification(_, NotificationPhase::Entering, message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn location_statuses(&self) -> Vec<(StatusKind, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::LocationStatus(kind, message) => Some((kind, message)),
                _ => None,
            })
            .collect()
    }

    pub fn typing_changes(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Typing(active) => Some(active),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render_trends(&self, trends: &[Trend]) {
        self.push(RenderEvent::Trends(trends.to_vec()));
    }

    fn render_history(&self, history: &[ChatMessage]) {
        self.push(RenderEvent::History(history.to_vec()));
    }

    fn set_typing(&self, active: bool) {
        self.push(RenderEvent::Typing(active));
    }

    fn set_chat_visible(&self, visible: bool) {
        self.push(RenderEvent::ChatVisible(visible));
    }

    fn set_location_prompt_visible(&self, visible: bool) {
        self.push(RenderEvent::LocationPrompt(visible));
    }

    fn set_location_status(&self, kind: StatusKind, message: &str) {
        self.push(RenderEvent::LocationStatus(kind, message.to_string()));
    }

    fn show_notification(&self, notification: &Notification, phase: NotificationPhase) {
        self.push(RenderEvent::Notification(notification.id, phase, notification.message.clone()));
    }

    fn remove_notification(&self, id: Uuid) {
        self.push(RenderEvent::NotificationRemoved(id));
    }

    fn clear_input(&self) {
        self.push(RenderEvent::InputCleared);
    }

    fn scroll_history(&self) {
        self.push(RenderEvent::HistoryScrolled);
    }

    fn focus_trends(&self) {
        self.push(RenderEvent::TrendsFocused);
    }
}
