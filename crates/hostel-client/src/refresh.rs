use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::{ComplaintClient, Listing};
use crate::error::ClientError;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Tracks the newest store revision a view has rendered, so that a slow
/// response can never replace a fresher one.
#[derive(Debug, Default, Clone)]
pub struct RevisionGate {
    newest: Option<u64>,
}

impl RevisionGate {
    pub fn newest(&self) -> Option<u64> {
        self.newest
    }

    /// Forget the newest revision, so the next listing is admitted whatever
    /// its number.
    pub fn reset(&mut self) {
        self.newest = None;
    }

    /// Whether a listing read at `revision` may replace the current one.
    /// Listings without a revision are always admitted.
    pub fn admit(&mut self, revision: Option<u64>) -> bool {
        match (revision, self.newest) {
            (Some(incoming), Some(newest)) if incoming < newest => false,
            (Some(incoming), _) => {
                self.newest = Some(incoming);
                true
            }
            (None, _) => true,
        }
    }
}

/// A view whose snapshot can be replaced by a fresh listing.
pub trait Refresh: Send {
    fn client(&self) -> &ComplaintClient;

    fn known_revision(&self) -> Option<u64>;

    /// Drop the known revision after the store was replaced.
    fn reset_revision(&mut self);

    /// Replace the snapshot. Returns false when the listing was stale.
    fn apply(&mut self, listing: Listing) -> bool;
}

/// A server revision below the newest one applied means the store was
/// recreated and counts from zero again.
fn is_store_reset(known: u64, current: u64) -> bool {
    if current < known {
        warn!("Store revision went back from {} to {}, resetting view", known, current);
        return true;
    }
    false
}

/// One refresh cycle. The view lock is not held across network calls, so
/// user actions can proceed while a poll is in flight.
pub async fn refresh_once<V: Refresh>(view: &Mutex<V>) -> Result<bool, ClientError> {
    let (client, known) = {
        let view = view.lock().await;
        (view.client().clone(), view.known_revision())
    };

    if let Some(known) = known {
        let current = client.revision().await?;
        if current == known {
            return Ok(false);
        }
        if is_store_reset(known, current) {
            view.lock().await.reset_revision();
        }
    }

    let listing = client.list().await?;
    Ok(view.lock().await.apply(listing))
}

/// Unconditional reload for a view the caller already holds, used after the
/// view's own mutations.
pub async fn reload<V: Refresh>(view: &mut V) -> Result<bool, ClientError> {
    let client = view.client().clone();

    if let Some(known) = view.known_revision() {
        if is_store_reset(known, client.revision().await?) {
            view.reset_revision();
        }
    }

    let listing = client.list().await?;
    Ok(view.apply(listing))
}

/// Refresh `view` every `every` until the task is dropped. Failures are
/// logged and the next tick tries again.
pub async fn run_refresh_loop<V: Refresh + 'static>(view: Arc<Mutex<V>>, every: Duration) {
    let mut interval = tokio::time::interval(every);

    loop {
        interval.tick().await;

        match refresh_once(view.as_ref()).await {
            Ok(true) => debug!("Refresh: listing replaced"),
            Ok(false) => {}
            Err(e) => warn!("Refresh failed: {}", e),
        }
    }
}
