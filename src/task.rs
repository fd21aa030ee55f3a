use std::future::Future;
use tokio::task::JoinHandle;

// Dropping the handle leaves the task running; `cancel` stops it
#[derive(Debug)]
pub struct TaskHandle {
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                log::error!("Background task panicked: {:?}", e);
            }
        }
    }
}
