use crate::models::{Notification, Severity};
use crate::render::{NotificationPhase, Renderer};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use uuid::Uuid;

/// Lifecycle timings. `display` counts from creation, so an entry starts
/// leaving at `display` and is gone at `display + exit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotificationTimings {
    pub enter: Duration,
    pub display: Duration,
    pub exit: Duration,
}

impl Default for NotificationTimings {
    fn default() -> Self {
        Self {
            enter: Duration::from_millis(100),
            display: Duration::from_millis(4000),
            exit: Duration::from_millis(300),
        }
    }
}

struct ActiveEntry {
    notification: Notification,
    seq: u64,
    task: Option<AbortHandle>,
}

struct Inner {
    renderer: Arc<dyn Renderer>,
    timings: NotificationTimings,
    max_visible: Option<usize>,
    active: DashMap<Uuid, ActiveEntry>,
    next_seq: AtomicU64,
}

/// Transient, self-dismissing alerts. Each entry runs its own scheduled
/// lifecycle task; the cancel handles live in a map keyed by notification id.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Inner>,
}

impl NotificationQueue {
    pub fn new(renderer: Arc<dyn Renderer>, timings: NotificationTimings, max_visible: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Inner {
                renderer,
                timings,
                max_visible,
                active: DashMap::new(),
                next_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Shows a notification and schedules its removal. Never fails: without a
    /// runtime to schedule on, the entry is removed straight away.
    pub fn enqueue(&self, message: impl Into<String>, severity: Severity) -> Uuid {
        let notification = Notification::new(message, severity);
        let id = notification.id;
        log::debug!("Notification {} [{}]: {}", id, severity, notification.message);

        self.inner.renderer.show_notification(&notification, NotificationPhase::Entering);
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        self.inner.active.insert(
            id,
            ActiveEntry {
                notification,
                seq,
                task: None,
            },
        );

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = self.inner.clone();
                let task = handle.spawn(async move { inner.run_lifecycle(id).await });
                if let Some(mut entry) = self.inner.active.get_mut(&id) {
                    entry.task = Some(task.abort_handle());
                }
            }
            Err(_) => {
                log::warn!("No runtime to schedule notification {}; removing immediately", id);
                self.inner.remove(id);
            }
        }

        self.enforce_cap();
        id
    }

    pub fn dismiss(&self, id: Uuid) -> bool {
        match self.inner.active.remove(&id) {
            Some((_, entry)) => {
                if let Some(task) = entry.task {
                    task.abort();
                }
                self.inner.renderer.remove_notification(id);
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        let ids: Vec<Uuid> = self.inner.active.iter().map(|e| *e.key()).collect();
        for id in ids {
            self.dismiss(id);
        }
    }

    pub fn active_count(&self) -> usize {
        self.inner.active.len()
    }

    // Oldest first
    pub fn active(&self) -> Vec<Notification> {
        let mut entries: Vec<(u64, Notification)> = self
            .inner
            .active
            .iter()
            .map(|e| (e.seq, e.notification.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, n)| n).collect()
    }

    fn enforce_cap(&self) {
        let Some(max) = self.inner.max_visible else {
            return;
        };
        while self.inner.active.len() > max {
            let oldest = self
                .inner
                .active
                .iter()
                .min_by_key(|e| e.seq)
                .map(|e| *e.key());
            match oldest {
                Some(id) => {
                    log::debug!("Notification cap {} reached, dismissing {}", max, id);
                    self.dismiss(id);
                }
                None => break,
            }
        }
    }
}

impl Inner {
    async fn run_lifecycle(self: Arc<Self>, id: Uuid) {
        tokio::time::sleep(self.timings.enter).await;
        self.transition(id, NotificationPhase::Visible);

        tokio::time::sleep(self.timings.display.saturating_sub(self.timings.enter)).await;
        self.transition(id, NotificationPhase::Leaving);

        tokio::time::sleep(self.timings.exit).await;
        self.remove(id);
    }

    fn transition(&self, id: Uuid, phase: NotificationPhase) {
        // Clone out so the map shard is not held across the renderer call
        let notification = self.active.get(&id).map(|e| e.notification.clone());
        if let Some(notification) = notification {
            self.renderer.show_notification(&notification, phase);
        }
    }

    fn remove(&self, id: Uuid) {
        if self.active.remove(&id).is_some() {
            self.renderer.remove_notification(id);
        }
    }
}
