//! bcn-scan
//!
//! Scan lifecycle: permission gate → strategy setup → listeners → resolver.
//!
//! - `port`: native collaborator traits (beacon subsystems, radio)
//! - `strategy`: per-platform setup sequence + event subscriptions
//! - `controller`: lifecycle state machine, single event queue, resolved view
//! - `direct`: low-level peripheral scan/connect path

mod controller;
mod direct;
mod error;
pub mod port;
pub mod strategy;

pub use controller::{ControllerOptions, ControllerStats, EventOutcome, ScanController, ScanPhase};
pub use direct::DirectScanner;
pub use error::{RadioError, ScanError, SubsystemError};
pub use strategy::{
    select_strategy, BeaconBackend, RangingStrategy, RegionEventStrategy, ScanEvent, ScanStarted, ScanStrategy,
    StrategyKind, Subscription,
};
