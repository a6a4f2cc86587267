//! Scan lifecycle controller.
//!
//! Owns the permission gate, the selected strategy and the resolver. Native
//! callbacks are forwarded onto one unbounded queue and applied here, one
//! batch at a time, so the resolver never sees two batches concurrently.
//! The resolved view is published on a `watch` channel; the UI only reads it.

use std::future::Future;

use bcn_engine::{ProximityResolver, ResolveOutcome, ResolverSets};
use bcn_permissions::PermissionGate;
use bcn_schemas::ResolvedProximity;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::error::ScanError;
use crate::strategy::{ScanEvent, ScanStrategy, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    NotStarted,
    PermissionDenied,
    Active,
    /// Scan stopped (explicitly or after resolving); listeners still attached.
    Halted,
    Disposed,
}

impl ScanPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPhase::NotStarted => "NOT_STARTED",
            ScanPhase::PermissionDenied => "PERMISSION_DENIED",
            ScanPhase::Active => "ACTIVE",
            ScanPhase::Halted => "HALTED",
            ScanPhase::Disposed => "DISPOSED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Stop the native scan once a store identity is held.
    pub halt_on_resolve: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self { halt_on_resolve: true }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub batches_applied: u64,
    /// Batches that arrived while the scan was not active.
    pub batches_dropped: u64,
    pub discovery_events: u64,
}

/// What happened to one queued event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Applied(ResolveOutcome),
    /// Observed only; never reaches the resolver.
    Observed { source: &'static str, count: usize },
    Dropped { source: &'static str },
}

pub struct ScanController {
    gate: PermissionGate,
    strategy: Box<dyn ScanStrategy>,
    resolver: ProximityResolver,
    options: ControllerOptions,
    phase: ScanPhase,
    queue_tx: Option<mpsc::UnboundedSender<ScanEvent>>,
    queue_rx: mpsc::UnboundedReceiver<ScanEvent>,
    subscriptions: Vec<Subscription>,
    view_tx: watch::Sender<ResolvedProximity>,
    stats: ControllerStats,
}

impl ScanController {
    pub fn new(
        gate: PermissionGate,
        strategy: Box<dyn ScanStrategy>,
        sets: ResolverSets,
        options: ControllerOptions,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (view_tx, _) = watch::channel(ResolvedProximity::scanning());
        Self {
            gate,
            strategy,
            resolver: ProximityResolver::new(sets),
            options,
            phase: ScanPhase::NotStarted,
            queue_tx: Some(queue_tx),
            queue_rx,
            subscriptions: Vec::new(),
            view_tx,
            stats: ControllerStats::default(),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn current(&self) -> &ResolvedProximity {
        self.resolver.current()
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Read-only view of the resolved proximity.
    pub fn view(&self) -> watch::Receiver<ResolvedProximity> {
        self.view_tx.subscribe()
    }

    /// Gate on permissions, run the strategy's setup, then attach listeners.
    ///
    /// A denial leaves the controller in `PermissionDenied` without touching
    /// the subsystem; a setup failure leaves it in `NotStarted`. Calling this
    /// while already active is a no-op.
    pub async fn start_scanning(&mut self) -> Result<(), ScanError> {
        self.ensure_not_disposed()?;
        if self.phase == ScanPhase::Active {
            debug!("start_scanning while active; ignored");
            return Ok(());
        }

        if !self.gate.request_required_permissions().await {
            self.phase = ScanPhase::PermissionDenied;
            warn!(platform = self.gate.platform().name(), "scan not started: permissions denied");
            return Err(ScanError::PermissionDenied);
        }

        self.begin().await
    }

    /// Re-run the permission gate after a denial. Never called automatically.
    pub async fn retry_permissions(&mut self) -> Result<(), ScanError> {
        self.ensure_not_disposed()?;
        info!(phase = self.phase.as_str(), "retrying permission gate");
        self.start_scanning().await
    }

    /// Stop the native scan. No-op unless active. On failure the phase stays
    /// `Active`.
    pub async fn stop_scanning(&mut self) -> Result<(), ScanError> {
        if self.phase != ScanPhase::Active {
            return Ok(());
        }
        self.strategy.stop().await.map_err(|e| {
            error!(error = %e, "scan stop failed");
            ScanError::SubsystemStop(e)
        })?;
        self.phase = ScanPhase::Halted;
        info!(state = self.current().scan_state.as_str(), "scan halted");
        Ok(())
    }

    /// Forget everything resolved so far and scan again.
    pub async fn rescan(&mut self) -> Result<(), ScanError> {
        self.ensure_not_disposed()?;
        self.stop_scanning().await?;
        self.resolver.reset();
        self.view_tx.send_replace(ResolvedProximity::scanning());
        self.start_scanning().await
    }

    /// Remove every listener and close the queue. Idempotent. Does not stop
    /// the native scan; call [`Self::stop_scanning`] first for that.
    pub fn dispose(&mut self) {
        if self.phase == ScanPhase::Disposed {
            return;
        }
        let removed = self.subscriptions.len();
        for mut sub in self.subscriptions.drain(..) {
            sub.remove();
        }
        self.queue_tx = None;
        self.queue_rx.close();
        self.phase = ScanPhase::Disposed;
        info!(listeners_removed = removed, "scan controller disposed");
    }

    /// Apply one event as if it had arrived on the queue.
    pub async fn handle_event(&mut self, event: ScanEvent) -> EventOutcome {
        let source = event.source();

        let Some(batch) = event.resolution_batch() else {
            self.stats.discovery_events += 1;
            debug!(source, count = event.len(), "discovery event observed");
            return EventOutcome::Observed {
                source,
                count: event.len(),
            };
        };

        if self.phase != ScanPhase::Active {
            self.stats.batches_dropped += 1;
            debug!(source, phase = self.phase.as_str(), "batch dropped; scan not active");
            return EventOutcome::Dropped { source };
        }

        let outcome = self.resolver.apply(batch);
        self.stats.batches_applied += 1;
        self.view_tx.send_if_modified(|view| {
            if *view == outcome.current {
                false
            } else {
                *view = outcome.current.clone();
                true
            }
        });

        // Checked on every applied batch so a failed stop is retried.
        if self.options.halt_on_resolve && outcome.current.store.is_some() {
            if let Err(e) = self.stop_scanning().await {
                warn!(error = %e, "halt after store resolution failed; retrying on next batch");
            }
        }

        EventOutcome::Applied(outcome)
    }

    /// Wait for the next queued event and apply it. `None` once disposed or
    /// the queue is closed.
    pub async fn process_next(&mut self) -> Option<EventOutcome> {
        if self.phase == ScanPhase::Disposed {
            return None;
        }
        let event = self.queue_rx.recv().await?;
        Some(self.handle_event(event).await)
    }

    /// Process events while the scan is active, until `shutdown` resolves.
    pub async fn run<F>(&mut self, shutdown: F) -> ControllerStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        while self.phase == ScanPhase::Active {
            let event = tokio::select! {
                _ = &mut shutdown => {
                    info!("scan loop shutdown requested");
                    break;
                }
                next = self.queue_rx.recv() => match next {
                    Some(event) => event,
                    None => break,
                },
            };
            self.handle_event(event).await;
        }
        self.stats
    }

    fn ensure_not_disposed(&self) -> Result<(), ScanError> {
        if self.phase == ScanPhase::Disposed {
            Err(ScanError::Disposed)
        } else {
            Ok(())
        }
    }

    async fn begin(&mut self) -> Result<(), ScanError> {
        let started = match self.strategy.start().await {
            Ok(started) => started,
            Err(e) => {
                self.phase = ScanPhase::NotStarted;
                error!(strategy = self.strategy.kind().as_str(), error = %e, "scan setup failed");
                return Err(ScanError::SubsystemSetup(e));
            }
        };

        let queue = self.queue_tx.as_ref().ok_or(ScanError::Disposed)?;
        // Listeners survive a halt; attaching again would duplicate batches.
        if self.subscriptions.is_empty() {
            self.subscriptions = self.strategy.subscribe(&started, queue);
        }

        self.phase = ScanPhase::Active;
        info!(
            strategy = started.kind().as_str(),
            listeners = self.subscriptions.len(),
            "scan active"
        );
        Ok(())
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        self.dispose();
    }
}
