use anyhow::Result;
use bcn_config::ProximityConfig;
use bcn_permissions::PermissionGate;
use bcn_scan::{
    select_strategy, BeaconBackend, ControllerOptions, EventOutcome, ScanController, ScanError,
};
use bcn_schemas::{BeaconObservation, HostPlatform, ResolvedIdentity, ResolvedProximity, ScanState};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::{shipped_sets, CallJournal, FakePermissionApi, FakeRangingSubsystem, FakeRegionSubsystem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayStep {
    /// Zero-based index into the recording.
    pub batch: usize,
    /// `applied` or `dropped`.
    pub outcome: &'static str,
    pub scan_state: ScanState,
    pub store: Option<ResolvedIdentity>,
    pub location: Option<ResolvedIdentity>,
    pub phase: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub platform: &'static str,
    pub start_error: Option<String>,
    pub steps: Vec<ReplayStep>,
    pub final_state: ResolvedProximity,
    pub final_phase: &'static str,
    pub batches_applied: u64,
    pub batches_dropped: u64,
    /// Native calls in the order the controller made them.
    pub calls: Vec<String>,
}

enum Emitter {
    Region(Arc<FakeRegionSubsystem>),
    Ranging(Arc<FakeRangingSubsystem>),
}

impl Emitter {
    /// Ranging hosts also see every batch as a discovery event first.
    fn emit(&self, batch: &[BeaconObservation]) -> usize {
        match self {
            Emitter::Region(fake) => fake.emit(batch.to_vec()),
            Emitter::Ranging(fake) => {
                fake.emit_discovered(batch.to_vec());
                fake.emit_ranged(batch.to_vec())
            }
        }
    }

    fn events_per_batch(&self) -> usize {
        match self {
            Emitter::Region(_) => 1,
            Emitter::Ranging(_) => 2,
        }
    }
}

/// Drive a full controller over scripted subsystems for the configured
/// platform, delivering each recorded batch in order.
pub async fn replay_batches(
    config: &ProximityConfig,
    batches: &[Vec<BeaconObservation>],
    grant_permissions: bool,
) -> Result<ReplayReport> {
    let platform = config.host.platform();
    let journal = CallJournal::new();

    let permissions = if grant_permissions {
        FakePermissionApi::granting(journal.clone())
    } else {
        FakePermissionApi::denying(journal.clone())
    };
    let gate = PermissionGate::new(platform, Box::new(permissions));

    let (emitter, backend) = match platform {
        HostPlatform::Android { .. } => {
            let fake = Arc::new(FakeRegionSubsystem::new(journal.clone()));
            (Emitter::Region(Arc::clone(&fake)), BeaconBackend::RegionEvent(fake))
        }
        HostPlatform::Ios => {
            let fake = Arc::new(FakeRangingSubsystem::new(journal.clone()));
            (
                Emitter::Ranging(Arc::clone(&fake)),
                BeaconBackend::Ranging {
                    subsystem: fake,
                    region: config.ranging.region.clone(),
                },
            )
        }
    };

    let strategy = select_strategy(platform, backend)?;
    let mut controller = ScanController::new(
        gate,
        strategy,
        shipped_sets(),
        ControllerOptions {
            halt_on_resolve: config.scan.halt_on_resolve,
        },
    );

    let mut report = ReplayReport {
        platform: platform.name(),
        start_error: None,
        steps: Vec::new(),
        final_state: ResolvedProximity::scanning(),
        final_phase: controller.phase().as_str(),
        batches_applied: 0,
        batches_dropped: 0,
        calls: Vec::new(),
    };

    match controller.start_scanning().await {
        Ok(()) => {}
        Err(e @ ScanError::PermissionDenied) | Err(e @ ScanError::SubsystemSetup(_)) => {
            report.start_error = Some(e.to_string());
        }
        Err(e) => return Err(e.into()),
    }

    if report.start_error.is_none() {
        for (index, batch) in batches.iter().enumerate() {
            if emitter.emit(batch) == 0 {
                break;
            }
            for _ in 0..emitter.events_per_batch() {
                let Some(outcome) = controller.process_next().await else {
                    break;
                };
                let label = match outcome {
                    EventOutcome::Applied(_) => "applied",
                    EventOutcome::Dropped { .. } => "dropped",
                    EventOutcome::Observed { .. } => continue,
                };
                let current = controller.current();
                report.steps.push(ReplayStep {
                    batch: index,
                    outcome: label,
                    scan_state: current.scan_state,
                    store: current.store.clone(),
                    location: current.location.clone(),
                    phase: controller.phase().as_str(),
                });
            }
        }
    }

    let stats = controller.stats();
    report.final_state = controller.current().clone();
    report.final_phase = controller.phase().as_str();
    report.batches_applied = stats.batches_applied;
    report.batches_dropped = stats.batches_dropped;
    controller.dispose();
    report.calls = journal.calls();

    info!(
        platform = report.platform,
        steps = report.steps.len(),
        state = report.final_state.scan_state.as_str(),
        "replay finished"
    );
    Ok(report)
}
