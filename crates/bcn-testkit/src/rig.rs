//! Pre-wired controllers over fake subsystems.

use bcn_config::identities::default_ranging_region;
use bcn_permissions::PermissionGate;
use bcn_scan::{select_strategy, BeaconBackend, ControllerOptions, ScanController};
use bcn_schemas::HostPlatform;
use std::sync::Arc;

use crate::{shipped_sets, CallJournal, FakePermissionApi, FakeRangingSubsystem, FakeRegionSubsystem};

pub struct RegionRig {
    pub journal: CallJournal,
    pub permissions: FakePermissionApi,
    pub subsystem: Arc<FakeRegionSubsystem>,
    pub controller: ScanController,
}

pub struct RangingRig {
    pub journal: CallJournal,
    pub subsystem: Arc<FakeRangingSubsystem>,
    pub controller: ScanController,
}

/// Android host at `api_level`, permissions granted unless changed through
/// `rig.permissions`.
pub fn region_rig(api_level: u32, halt_on_resolve: bool) -> RegionRig {
    let journal = CallJournal::new();
    let permissions = FakePermissionApi::granting(journal.clone());
    let subsystem = Arc::new(FakeRegionSubsystem::new(journal.clone()));
    let platform = HostPlatform::Android { api_level };

    let gate = PermissionGate::new(platform, Box::new(permissions.clone()));
    let strategy = select_strategy(platform, BeaconBackend::RegionEvent(subsystem.clone()))
        .expect("android host accepts the region-event backend");
    let controller = ScanController::new(gate, strategy, shipped_sets(), ControllerOptions { halt_on_resolve });

    RegionRig {
        journal,
        permissions,
        subsystem,
        controller,
    }
}

/// iOS host ranging the default region.
pub fn ranging_rig(halt_on_resolve: bool) -> RangingRig {
    let journal = CallJournal::new();
    let subsystem = Arc::new(FakeRangingSubsystem::new(journal.clone()));

    let gate = PermissionGate::new(
        HostPlatform::Ios,
        Box::new(FakePermissionApi::denying(journal.clone())),
    );
    let backend = BeaconBackend::Ranging {
        subsystem: subsystem.clone(),
        region: default_ranging_region(),
    };
    let strategy = select_strategy(HostPlatform::Ios, backend).expect("ios host accepts the ranging backend");
    let controller = ScanController::new(gate, strategy, shipped_sets(), ControllerOptions { halt_on_resolve });

    RangingRig {
        journal,
        subsystem,
        controller,
    }
}
