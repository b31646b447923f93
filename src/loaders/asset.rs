//! Background asset loading with a stale-result guard and a bounded wait.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

use super::gltf::load_model;
use crate::core::Transform;
use crate::error::LoadError;
use crate::scenes::{fallback_character, ModelAsset};

/// Function that turns a request into a model; runs on a worker thread
pub type Fetcher = Arc<dyn Fn(&Path, &Transform) -> Result<ModelAsset, LoadError> + Send + Sync>;

/// Identifies one load request. Only the newest ticket can be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    pub path: PathBuf,
    pub base: Transform,
}

/// Outcome of a request. A failure always carries the fallback model.
#[derive(Debug)]
pub enum Resolution {
    Loaded(ModelAsset),
    Failed { error: LoadError, fallback: ModelAsset },
}

impl Resolution {
    pub fn asset(&self) -> &ModelAsset {
        match self {
            Resolution::Loaded(asset) => asset,
            Resolution::Failed { fallback, .. } => fallback,
        }
    }

    pub fn into_asset(self) -> ModelAsset {
        match self {
            Resolution::Loaded(asset) => asset,
            Resolution::Failed { fallback, .. } => fallback,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Resolution::Failed { .. })
    }

    fn failed(error: LoadError) -> Self {
        log::warn!("Asset load failed, using fallback model: {}", error);
        Resolution::Failed {
            error,
            fallback: fallback_character(),
        }
    }
}

type Message = (LoadTicket, Result<ModelAsset, LoadError>);

struct Pending {
    ticket: LoadTicket,
    started: Instant,
    worker: Option<JoinHandle<()>>,
}

/// Loads model assets off the event-loop thread.
///
/// Results come back over a channel and are picked up by [`AssetLoader::poll`]
/// once per frame. A result whose ticket is no longer the pending one is
/// dropped, which covers rapid remounts and requests abandoned on teardown.
pub struct AssetLoader {
    fetcher: Fetcher,
    timeout: Duration,
    generation: u64,
    pending: Option<Pending>,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    discarded: u64,
}

impl AssetLoader {
    /// Loader backed by the glTF importer
    pub fn new(timeout: Duration) -> Self {
        Self::with_fetcher(Arc::new(|path: &Path, base: &Transform| load_model(path, base)), timeout)
    }

    pub fn with_fetcher(fetcher: Fetcher, timeout: Duration) -> Self {
        let (tx, rx) = unbounded();
        Self {
            fetcher,
            timeout,
            generation: 0,
            pending: None,
            tx,
            rx,
            discarded: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start a load. Any earlier pending request becomes stale.
    pub fn request(&mut self, request: AssetRequest, now: Instant) -> LoadTicket {
        self.generation += 1;
        let ticket = LoadTicket(self.generation);
        if let Some(previous) = self.pending.take() {
            log::debug!("Superseding load request #{}", previous.ticket.0);
        }

        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("asset-loader-{}", ticket.0))
            .spawn(move || {
                let result = fetcher(&request.path, &request.base);
                // The loader may be gone by now; nothing to do then
                let _ = tx.unbounded_send((ticket, result));
            });

        let worker = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to spawn loader thread: {}", e);
                None
            }
        };

        self.pending = Some(Pending {
            ticket,
            started: now,
            worker,
        });
        ticket
    }

    /// Abandon a request; its result will be discarded when it arrives
    pub fn cancel(&mut self, ticket: LoadTicket) -> bool {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => {
                log::debug!("Abandoning load request #{}", ticket.0);
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> Option<LoadTicket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    /// Results dropped because their request was superseded or abandoned
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Collect the result of the pending request, if it has one by now.
    /// Timeouts and dead workers resolve with the fallback.
    pub fn poll(&mut self, now: Instant) -> Option<(LoadTicket, Resolution)> {
        if let Some(done) = self.drain() {
            return Some(done);
        }

        let pending = self.pending.as_mut()?;
        let ticket = pending.ticket;
        let worker_gone = match pending.worker.take() {
            Some(worker) if worker.is_finished() => {
                // Joining orders the worker's send before the second drain
                if worker.join().is_err() {
                    log::error!("Loader thread for request #{} panicked", ticket.0);
                }
                true
            }
            Some(worker) => {
                pending.worker = Some(worker);
                false
            }
            None => true,
        };

        if worker_gone {
            if let Some(done) = self.drain() {
                return Some(done);
            }
            self.pending = None;
            return Some((ticket, Resolution::failed(LoadError::Disconnected)));
        }

        let started = self.pending.as_ref()?.started;
        if now.saturating_duration_since(started) >= self.timeout {
            self.pending = None;
            return Some((ticket, Resolution::failed(LoadError::Timeout(self.timeout))));
        }
        None
    }

    /// Take every queued message, keeping only the pending request's result
    fn drain(&mut self) -> Option<(LoadTicket, Resolution)> {
        let mut resolved = None;
        while let Ok(Some((ticket, result))) = self.rx.try_next() {
            if self.pending() == Some(ticket) {
                self.pending = None;
                resolved = Some((ticket, result));
            } else {
                self.discarded += 1;
                log::debug!("Discarding stale asset result #{}", ticket.0);
            }
        }

        resolved.map(|(ticket, result)| {
            let resolution = match result {
                Ok(asset) => Resolution::Loaded(asset),
                Err(error) => Resolution::failed(error),
            };
            (ticket, resolution)
        })
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("timeout", &self.timeout)
            .field("generation", &self.generation)
            .field("pending", &self.pending())
            .field("discarded", &self.discarded)
            .finish()
    }
}
