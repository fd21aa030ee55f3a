use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

// A single entry in the chat history. Never mutated after it is appended.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }
}

// A market trend card. The set is fixed at startup; only `timestamp` changes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub impact: String, // e.g. "+85% sales"
    pub is_hot: bool,
    pub timestamp: DateTime<Utc>,
}

impl Trend {
    fn seed(id: u32, title: &str, description: &str, category: &str, impact: &str, is_hot: bool, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            impact: impact.to_string(),
            is_hot,
            timestamp: now,
        }
    }
}

/// The simulated trend set shown at startup.
pub fn seed_trends(now: DateTime<Utc>) -> Vec<Trend> {
    vec![
        Trend::seed(
            1,
            "Cricket World Cup Victory Celebration",
            "Massive demand for team merchandise and celebratory snacks",
            "Sports",
            "+85% sales",
            true,
            now,
        ),
        Trend::seed(
            2,
            "Monsoon Season Essentials",
            "Umbrellas, raincoats, and hot beverages in high demand",
            "Weather",
            "+60% sales",
            true,
            now,
        ),
        Trend::seed(
            3,
            "Festival Season Approaching",
            "Traditional sweets and decorative items trending",
            "Festival",
            "+70% sales",
            false,
            now,
        ),
        Trend::seed(
            4,
            "Health Consciousness Rising",
            "Fresh juices and organic snacks gaining popularity",
            "Health",
            "+45% sales",
            false,
            now,
        ),
    ]
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            created_at: Utc::now(),
        }
    }
}

// Lives only for one run of the location flow
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationResult {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64, // metres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_place_name: Option<String>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_open: bool,
    pub is_typing: bool,
    pub history: Vec<ChatMessage>,
}
