use crate::error::VendorError;
use crate::geolocation::Position;
use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;
use strum::{Display, EnumString};

// --- Environment keys ---

const BACKEND_KEY: &str = "VENDORAI_BACKEND";
const API_URL_KEY: &str = "VENDORAI_API_URL";
const REQUEST_TIMEOUT_KEY: &str = "VENDORAI_REQUEST_TIMEOUT_MS";
const REPLY_DELAY_KEY: &str = "VENDORAI_REPLY_DELAY_MS";
const TREND_INTERVAL_KEY: &str = "VENDORAI_TREND_INTERVAL_MS";
const NOTIFICATION_KEY: &str = "VENDORAI_NOTIFICATION_MS";
const MAX_NOTIFICATIONS_KEY: &str = "VENDORAI_MAX_NOTIFICATIONS";
const POSITION_KEY: &str = "VENDORAI_POSITION";
const SEED_KEY: &str = "VENDORAI_SEED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendKind {
    /// `POST {api_url}/api/chat`
    Http,
    /// Local keyword replies, no network
    Keyword,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend: BackendKind,
    pub api_url: String,
    pub request_timeout: Duration,
    pub reply_delay: Duration,
    pub trend_interval: Duration,
    pub notification_display: Duration,
    pub max_notifications: Option<usize>,
    pub position: Option<Position>,
    pub seed: Option<u64>,
    pub location_handoff_delay: Duration,
    pub analysis_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Http,
            api_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: Duration::from_secs(30),
            reply_delay: Duration::from_millis(800),
            trend_interval: Duration::from_millis(30_000),
            notification_display: Duration::from_millis(4000),
            max_notifications: None,
            position: None,
            seed: None,
            location_handoff_delay: Duration::from_millis(2000),
            analysis_delay: Duration::from_millis(2000),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(value) = lookup(BACKEND_KEY) {
            settings.backend = BackendKind::from_str(value.trim())
                .with_context(|| format!("Invalid value for {}: '{}'", BACKEND_KEY, value))?;
        }
        if let Some(value) = lookup(API_URL_KEY) {
            settings.api_url = value.trim().to_string();
        }
        if let Some(ms) = parse_key::<u64, _>(&lookup, REQUEST_TIMEOUT_KEY)? {
            settings.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_key::<u64, _>(&lookup, REPLY_DELAY_KEY)? {
            settings.reply_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_key::<u64, _>(&lookup, TREND_INTERVAL_KEY)? {
            if ms == 0 {
                return Err(VendorError::Config(format!("{} must be greater than zero", TREND_INTERVAL_KEY)).into());
            }
            settings.trend_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_key::<u64, _>(&lookup, NOTIFICATION_KEY)? {
            settings.notification_display = Duration::from_millis(ms);
        }
        if let Some(max) = parse_key::<usize, _>(&lookup, MAX_NOTIFICATIONS_KEY)? {
            if max == 0 {
                return Err(VendorError::Config(format!("{} must be greater than zero", MAX_NOTIFICATIONS_KEY)).into());
            }
            settings.max_notifications = Some(max);
        }
        if let Some(value) = lookup(POSITION_KEY) {
            settings.position = Some(
                parse_position(&value).with_context(|| format!("Invalid value for {}", POSITION_KEY))?,
            );
        }
        settings.seed = parse_key::<u64, _>(&lookup, SEED_KEY)?;

        log::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}

fn parse_key<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: '{}'", key, value)),
        None => Ok(None),
    }
}

/// Parses `"lat,lng"` or `"lat,lng,accuracy"`.
pub fn parse_position(value: &str) -> Result<Position> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(VendorError::Config(format!("expected 'lat,lng[,accuracy]', got '{}'", value)).into());
    }
    let latitude: f64 = parts[0].parse().context("Latitude is not a number")?;
    let longitude: f64 = parts[1].parse().context("Longitude is not a number")?;
    let accuracy: f64 = match parts.get(2) {
        Some(raw) => raw.parse().context("Accuracy is not a number")?,
        None => 0.0,
    };
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(VendorError::Config(format!("coordinates out of range: {}, {}", latitude, longitude)).into());
    }
    Ok(Position {
        latitude,
        longitude,
        accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.trend_interval, Duration::from_secs(30));
    }

    #[test]
    fn reads_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("VENDORAI_BACKEND", "Keyword"),
            ("VENDORAI_API_URL", "http://example.test"),
            ("VENDORAI_MAX_NOTIFICATIONS", "3"),
            ("VENDORAI_POSITION", "12.97, 77.59, 30"),
            ("VENDORAI_SEED", "7"),
        ]))
        .unwrap();
        assert_eq!(settings.backend, BackendKind::Keyword);
        assert_eq!(settings.api_url, "http://example.test");
        assert_eq!(settings.max_notifications, Some(3));
        assert_eq!(settings.seed, Some(7));
        let position = settings.position.unwrap();
        assert_eq!(position.accuracy, 30.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Settings::from_lookup(lookup(&[("VENDORAI_BACKEND", "carrier-pigeon")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("VENDORAI_REQUEST_TIMEOUT_MS", "soon")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("VENDORAI_TREND_INTERVAL_MS", "0")])).is_err());
    }

    #[test]
    fn zero_notification_cap_is_rejected() {
        let err = Settings::from_lookup(lookup(&[("VENDORAI_MAX_NOTIFICATIONS", "0")])).unwrap_err();
        assert!(err.to_string().contains("VENDORAI_MAX_NOTIFICATIONS"));
        let settings = Settings::from_lookup(lookup(&[("VENDORAI_MAX_NOTIFICATIONS", "1")])).unwrap();
        assert_eq!(settings.max_notifications, Some(1));
    }

    #[test]
    fn position_parsing() {
        assert!(parse_position("12.9,77.6").is_ok());
        assert!(parse_position("12.9").is_err());
        assert!(parse_position("95,10").is_err());
        assert!(parse_position("a,b").is_err());
    }
}
