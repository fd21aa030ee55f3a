use crate::models::{seed_trends, Severity, Trend};
use crate::notifications::NotificationQueue;
use crate::random::RandomSource;
use crate::render::Renderer;
use crate::task::TaskHandle;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const TREND_INTERVAL: Duration = Duration::from_secs(30);

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 1440;

/// Short age label for a trend card. Future timestamps count as "Just now".
pub fn format_relative_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_minutes();
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < MINUTES_PER_HOUR {
        format!("{}m ago", minutes)
    } else if minutes < MINUTES_PER_DAY {
        format!("{}h ago", minutes / MINUTES_PER_HOUR)
    } else {
        format!("{}d ago", minutes / MINUTES_PER_DAY)
    }
}

#[derive(Clone)]
pub struct TrendFeed {
    trends: Arc<Mutex<Vec<Trend>>>,
    renderer: Arc<dyn Renderer>,
    notifications: NotificationQueue,
    rng: Arc<dyn RandomSource>,
}

impl TrendFeed {
    pub fn new(renderer: Arc<dyn Renderer>, notifications: NotificationQueue, rng: Arc<dyn RandomSource>) -> Self {
        Self::with_trends(seed_trends(Utc::now()), renderer, notifications, rng)
    }

    pub fn with_trends(
        trends: Vec<Trend>,
        renderer: Arc<dyn Renderer>,
        notifications: NotificationQueue,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            trends: Arc::new(Mutex::new(trends)),
            renderer,
            notifications,
            rng,
        }
    }

    pub async fn snapshot(&self) -> Vec<Trend> {
        self.trends.lock().await.clone()
    }

    pub async fn render(&self) {
        let trends = self.snapshot().await;
        self.renderer.render_trends(&trends);
    }

    /// Refreshes one randomly chosen trend, announces it and re-renders.
    /// Returns the updated trend, or `None` for an empty feed.
    pub async fn tick(&self) -> Option<Trend> {
        let (updated, snapshot) = {
            let mut trends = self.trends.lock().await;
            if trends.is_empty() {
                return None;
            }
            let idx = self.rng.pick_index(trends.len()) % trends.len();
            trends[idx].timestamp = Utc::now();
            (trends[idx].clone(), trends.clone())
        };

        log::debug!("Trend {} refreshed: {}", updated.id, updated.title);
        self.notifications
            .enqueue(format!("📈 Trend Update: {}", updated.title), Severity::Info);
        self.renderer.render_trends(&snapshot);
        Some(updated)
    }

    // First tick one period from now
    pub fn start(&self, period: Duration) -> TaskHandle {
        log::info!("Starting trend updates every {:?}", period);
        let feed = self.clone();
        TaskHandle::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                feed.tick().await;
            }
        })
    }
}
