use crate::chat::ChatSession;
use crate::error::{VendorError, VendorResult};
use crate::models::LocationResult;
use crate::random::{pick, RandomSource};
use crate::render::{Renderer, StatusKind};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Cached fixes up to this age are acceptable
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(10_000),
            maximum_age: Duration::from_millis(60_000),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

/// The platform's location capability.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    fn is_supported(&self) -> bool;

    /// One-shot fix. Denial and lookup errors come back as
    /// `GeolocationDenied`.
    async fn current_position(&self, options: &PositionOptions) -> VendorResult<Position>;
}

/// Turns coordinates into a display string.
#[async_trait]
pub trait PlaceResolver: Send + Sync {
    async fn resolve(&self, latitude: f64, longitude: f64) -> Result<String>;
}

// Platform without location support
pub struct UnsupportedProvider;

#[async_trait]
impl GeolocationProvider for UnsupportedProvider {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(&self, _options: &PositionOptions) -> VendorResult<Position> {
        Err(VendorError::GeolocationUnsupported)
    }
}

/// Reports a configured position, e.g. from `VENDORAI_POSITION`.
pub struct FixedPositionProvider {
    position: Position,
}

impl FixedPositionProvider {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

#[async_trait]
impl GeolocationProvider for FixedPositionProvider {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self, _options: &PositionOptions) -> VendorResult<Position> {
        Ok(self.position)
    }
}

pub const CANDIDATE_AREAS: [&str; 6] = [
    "Brigade Road, Bangalore",
    "Commercial Street, Bangalore",
    "MG Road, Bangalore",
    "Koramangala, Bangalore",
    "Indiranagar, Bangalore",
    "Jayanagar, Bangalore",
];

/// Stand-in reverse geocoder: ignores the coordinates and picks an area.
pub struct SimulatedPlaceResolver {
    rng: Arc<dyn RandomSource>,
}

impl SimulatedPlaceResolver {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }
}

#[async_trait]
impl PlaceResolver for SimulatedPlaceResolver {
    async fn resolve(&self, _latitude: f64, _longitude: f64) -> Result<String> {
        pick(self.rng.as_ref(), &CANDIDATE_AREAS)
            .map(|area| area.to_string())
            .ok_or_else(|| anyhow::anyhow!("No candidate areas"))
    }
}

const ADVICE_POOL: [&str; 5] = [
    "🍹 Fresh juice stalls perform 40% better in this area",
    "🍿 Evening snacks have peak demand from 5-8 PM here",
    "📱 Mobile accessories show strong weekend sales",
    "🌮 Street food has consistent demand throughout the day",
    "☕ Hot beverages are popular during morning hours",
];

const FALLBACK_PLACE: &str = "your area";

/// First three entries of the advice pool, one per line.
pub fn recommendations() -> String {
    ADVICE_POOL[..3].join("\n")
}

pub fn recommendation_message(place: &str) -> String {
    format!(
        "📍 Great! I detected you're near {}. Here are some personalized recommendations for your area:\n\n{}",
        place,
        recommendations()
    )
}

#[derive(Clone, Debug, PartialEq)]
pub enum LocationState {
    Idle,
    Requesting,
    Resolved(LocationResult),
    Denied,
    Unsupported,
    TimedOut,
}

impl LocationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LocationState::Idle | LocationState::Requesting)
    }
}

struct FlowInner {
    state: Mutex<LocationState>,
    prompt_open: AtomicBool,
    provider: Arc<dyn GeolocationProvider>,
    resolver: Arc<dyn PlaceResolver>,
    renderer: Arc<dyn Renderer>,
    chat: ChatSession,
    options: PositionOptions,
    handoff_delay: Duration,
}

/// Consent-driven location detection. One run at a time; each run ends in a
/// terminal state and the user has to ask again to retry.
#[derive(Clone)]
pub struct GeolocationFlow {
    inner: Arc<FlowInner>,
}

impl GeolocationFlow {
    pub fn new(
        provider: Arc<dyn GeolocationProvider>,
        resolver: Arc<dyn PlaceResolver>,
        renderer: Arc<dyn Renderer>,
        chat: ChatSession,
        options: PositionOptions,
        handoff_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(FlowInner {
                state: Mutex::new(LocationState::Idle),
                prompt_open: AtomicBool::new(false),
                provider,
                resolver,
                renderer,
                chat,
                options,
                handoff_delay,
            }),
        }
    }

    // --- Consent prompt ---

    pub fn show_prompt(&self) {
        self.set_prompt(true);
    }

    pub fn hide_prompt(&self) {
        self.set_prompt(false);
    }

    pub fn is_prompt_open(&self) -> bool {
        self.inner.prompt_open.load(Ordering::Acquire)
    }

    fn set_prompt(&self, visible: bool) {
        self.inner.prompt_open.store(visible, Ordering::Release);
        self.inner.renderer.set_location_prompt_visible(visible);
    }

    pub async fn state(&self) -> LocationState {
        self.inner.state.lock().await.clone()
    }

    /// Runs one detection after the user consented. Returns the state the run
    /// ended in, or `Requesting` when another run (including its chat
    /// hand-off) was already in progress.
    pub async fn detect(&self) -> LocationState {
        {
            let mut state = self.inner.state.lock().await;
            if *state == LocationState::Requesting {
                log::debug!("Location detection already in progress");
                return LocationState::Requesting;
            }
            if !self.inner.provider.is_supported() {
                return self.finish_locked(&mut state, VendorError::GeolocationUnsupported);
            }
            *state = LocationState::Requesting;
        }
        log::info!("Detecting location");
        self.inner
            .renderer
            .set_location_status(StatusKind::Loading, "🔍 Detecting location...");

        let options = self.inner.options;
        let position = match tokio::time::timeout(options.timeout, self.inner.provider.current_position(&options)).await
        {
            Ok(result) => result,
            Err(_) => Err(VendorError::GeolocationTimedOut(options.timeout.as_millis() as u64)),
        };

        let position = match position {
            Ok(position) => position,
            Err(e) => {
                let mut state = self.inner.state.lock().await;
                return self.finish_locked(&mut state, e);
            }
        };

        // Lookup gets the same budget as the position request
        let lookup = self.inner.resolver.resolve(position.latitude, position.longitude);
        let place = match tokio::time::timeout(options.timeout, lookup).await {
            Ok(Ok(place)) => Some(place),
            Ok(Err(e)) => {
                log::warn!("Place lookup failed, continuing without a name: {:?}", e);
                None
            }
            Err(_) => {
                log::warn!("Place lookup timed out after {:?}, continuing without a name", options.timeout);
                None
            }
        };
        let result = LocationResult {
            latitude: position.latitude,
            longitude: position.longitude,
            accuracy: position.accuracy,
            resolved_place_name: place.clone(),
        };
        let display = place.unwrap_or_else(|| FALLBACK_PLACE.to_string());

        log::info!("Location resolved to {}", display);
        self.inner
            .renderer
            .set_location_status(StatusKind::Success, &format!("✅ Location detected: {}", display));

        // Still Requesting until the hand-off lands, so a repeat trigger
        // cannot post a second recommendation
        tokio::time::sleep(self.inner.handoff_delay).await;
        self.hide_prompt();
        self.inner.chat.inject_bot_message(recommendation_message(&display)).await;
        self.inner.chat.toggle(true);

        let resolved = LocationState::Resolved(result);
        *self.inner.state.lock().await = resolved.clone();
        resolved
    }

    fn finish_locked(&self, state: &mut LocationState, error: VendorError) -> LocationState {
        let (next, message) = match &error {
            VendorError::GeolocationUnsupported => (LocationState::Unsupported, "❌ Geolocation not supported"),
            VendorError::GeolocationTimedOut(_) => (LocationState::TimedOut, "❌ Location request timed out"),
            _ => (LocationState::Denied, "❌ Location access denied"),
        };
        log::error!("Location detection failed: {}", error);
        *state = next.clone();
        self.inner.renderer.set_location_status(StatusKind::Error, message);
        next
    }
}
