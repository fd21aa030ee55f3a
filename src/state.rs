use crate::api::{HttpReplyBackend, KeywordReplyBackend, ReplyBackend};
use crate::chat::ChatSession;
use crate::commands::{self, Command};
use crate::config::{BackendKind, Settings};
use crate::geolocation::{
    FixedPositionProvider, GeolocationFlow, GeolocationProvider, PlaceResolver, PositionOptions,
    SimulatedPlaceResolver, UnsupportedProvider,
};
use crate::notifications::{NotificationQueue, NotificationTimings};
use crate::random::{RandomSource, SeededRandom, ThreadRandom};
use crate::render::Renderer;
use crate::task::TaskHandle;
use crate::trends::TrendFeed;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct Collaborators {
    pub renderer: Arc<dyn Renderer>,
    pub backend: Arc<dyn ReplyBackend>,
    pub geolocation: Arc<dyn GeolocationProvider>,
    pub resolver: Arc<dyn PlaceResolver>,
    pub rng: Arc<dyn RandomSource>,
}

impl Collaborators {
    pub fn from_settings(settings: &Settings, renderer: Arc<dyn Renderer>) -> Result<Self> {
        let rng: Arc<dyn RandomSource> = match settings.seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        };

        let backend: Arc<dyn ReplyBackend> = match settings.backend {
            BackendKind::Http => Arc::new(HttpReplyBackend::new(&settings.api_url, settings.request_timeout)?),
            BackendKind::Keyword => Arc::new(KeywordReplyBackend::new(rng.clone(), settings.reply_delay)),
        };

        let geolocation: Arc<dyn GeolocationProvider> = match settings.position {
            Some(position) => Arc::new(FixedPositionProvider::new(position)),
            None => Arc::new(UnsupportedProvider),
        };

        Ok(Self {
            renderer,
            backend,
            geolocation,
            resolver: Arc::new(SimulatedPlaceResolver::new(rng.clone())),
            rng,
        })
    }
}

// Core application state; constructed once and shared by command handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatSession,
    pub location: GeolocationFlow,
    pub trends: TrendFeed,
    pub notifications: NotificationQueue,
    pub renderer: Arc<dyn Renderer>,
    pub analysis_delay: Duration,
    trend_interval: Duration,
    trend_ticker: Arc<Mutex<Option<TaskHandle>>>,
}

impl AppState {
    /// Must be called inside a Tokio runtime (the chat lane is spawned here).
    pub fn new(collaborators: Collaborators, settings: &Settings) -> Self {
        let Collaborators {
            renderer,
            backend,
            geolocation,
            resolver,
            rng,
        } = collaborators;

        let timings = NotificationTimings {
            display: settings.notification_display,
            ..NotificationTimings::default()
        };
        let notifications = NotificationQueue::new(renderer.clone(), timings, settings.max_notifications);
        let chat = ChatSession::new(backend, renderer.clone());
        let location = GeolocationFlow::new(
            geolocation,
            resolver,
            renderer.clone(),
            chat.clone(),
            PositionOptions::default(),
            settings.location_handoff_delay,
        );
        let trends = TrendFeed::new(renderer.clone(), notifications.clone(), rng);

        Self {
            chat,
            location,
            trends,
            notifications,
            renderer,
            analysis_delay: settings.analysis_delay,
            trend_interval: settings.trend_interval,
            trend_ticker: Arc::new(Mutex::new(None)),
        }
    }

    pub fn from_settings(settings: &Settings, renderer: Arc<dyn Renderer>) -> Result<Self> {
        let collaborators = Collaborators::from_settings(settings, renderer)?;
        Ok(Self::new(collaborators, settings))
    }

    // Calling it again restarts the updater
    pub async fn start(&self) {
        self.trends.render().await;
        let ticker = self.trends.start(self.trend_interval);
        if let Some(previous) = self.trend_ticker.lock().await.replace(ticker) {
            previous.cancel();
        }
    }

    pub async fn shutdown(&self) {
        if let Some(ticker) = self.trend_ticker.lock().await.take() {
            ticker.cancel();
        }
        self.notifications.clear();
        log::info!("Assistant shut down");
    }

    pub async fn dispatch(&self, command: Command) -> Option<TaskHandle> {
        commands::dispatch(self, command).await
    }

    pub fn is_location_prompt_open(&self) -> bool {
        self.location.is_prompt_open()
    }
}
