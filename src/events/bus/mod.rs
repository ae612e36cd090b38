// src/events/bus/mod.rs

pub mod change_bus;

pub use change_bus::{ChangeBus, PublishLogEntry, SnapshotSource, SubscriptionId};
