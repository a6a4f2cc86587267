//! Ports for the native collaborators the engine drives.
//!
//! Implementations live outside this crate (platform SDK bindings, or the
//! scripted fakes in `bcn-testkit`). Every event stream is a
//! `tokio::sync::broadcast` channel; each receiver handed out is one
//! listener, removed by dropping it.

mod radio;
mod subsystem;

pub use radio::{RadioApi, RadioCallback, ScanOptions};
pub use subsystem::{
    BeaconsRanged, BeaconsUpdated, DevicesDiscovered, RangingBeaconSubsystem, RegionBeaconSubsystem,
};
