// src/events/mod.rs
//
// Change notification system - Public API
//
// The Handler type alias is INTERNAL to the bus and must NOT be exported

pub mod bus;
pub mod types;

// ============================================================================
// PUBLIC EXPORTS - Notification Types and Bus Only
// ============================================================================

pub use types::DomainEvent;

pub use types::{
    AuthChanged, Category, ChangeKind, ChangeNotification, Interest, ListsChanged, RosterChanged,
};

pub use bus::{ChangeBus, PublishLogEntry, SnapshotSource, SubscriptionId};
