// src/events/types.rs
//
// Change notifications published to interested screens.
// Each notification carries the new state snapshot, never a diff.
//
// CRITICAL RULES:
// - Notifications are facts, not commands
// - Notifications are immutable and never persisted
// - No business logic in notification types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{MovieEntry, UserRecord};

/// Trait that all notifications must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this notification instance
    fn event_id(&self) -> Uuid;

    /// When this notification was created
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable notification type name
    fn event_type(&self) -> &'static str;
}

/// What happened to the state being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Updated,
}

/// The three kinds of change a screen can be told about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Auth,
    Lists,
    Roster,
}

impl Category {
    /// Replay order on subscription
    pub const ALL: [Category; 3] = [Category::Auth, Category::Lists, Category::Roster];
}

/// What a subscriber registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interest {
    Auth,
    Lists,
    Roster,
    All,
}

impl Interest {
    pub fn matches(&self, category: Category) -> bool {
        matches!(
            (self, category),
            (Interest::All, _)
                | (Interest::Auth, Category::Auth)
                | (Interest::Lists, Category::Lists)
                | (Interest::Roster, Category::Roster)
        )
    }
}

// ============================================================================
// AUTH
// ============================================================================

/// Emitted when the signed-in state changes or an auth attempt fails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub change: ChangeKind,
    pub signed_in: bool,
    /// Set when an auth attempt failed
    pub error: Option<String>,
}

impl AuthChanged {
    pub fn new(change: ChangeKind, signed_in: bool, error: Option<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            change,
            signed_in,
            error,
        }
    }

    pub fn signed_in() -> Self {
        Self::new(ChangeKind::Updated, true, None)
    }

    pub fn signed_out() -> Self {
        Self::new(ChangeKind::Updated, false, None)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(ChangeKind::Updated, false, Some(message.into()))
    }
}

impl DomainEvent for AuthChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "AuthChanged" }
}

// ============================================================================
// LISTS
// ============================================================================

/// Emitted when the signed-in user's lists are (re)loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListsChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub change: ChangeKind,
    pub movies_watched: Vec<MovieEntry>,
    pub movies_to_watch: Vec<MovieEntry>,
}

impl ListsChanged {
    pub fn new(
        change: ChangeKind,
        movies_watched: Vec<MovieEntry>,
        movies_to_watch: Vec<MovieEntry>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            change,
            movies_watched,
            movies_to_watch,
        }
    }
}

impl DomainEvent for ListsChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "ListsChanged" }
}

// ============================================================================
// ROSTER
// ============================================================================

/// Emitted when the roster of other public users is refreshed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub change: ChangeKind,
    pub users: Vec<UserRecord>,
}

impl RosterChanged {
    pub fn new(change: ChangeKind, users: Vec<UserRecord>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            change,
            users,
        }
    }
}

impl DomainEvent for RosterChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "RosterChanged" }
}

// ============================================================================
// TAGGED NOTIFICATION
// ============================================================================

/// The single type carried by the change bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ChangeNotification {
    Auth(AuthChanged),
    Lists(ListsChanged),
    Roster(RosterChanged),
}

impl ChangeNotification {
    pub fn category(&self) -> Category {
        match self {
            ChangeNotification::Auth(_) => Category::Auth,
            ChangeNotification::Lists(_) => Category::Lists,
            ChangeNotification::Roster(_) => Category::Roster,
        }
    }

    pub fn change(&self) -> ChangeKind {
        match self {
            ChangeNotification::Auth(e) => e.change,
            ChangeNotification::Lists(e) => e.change,
            ChangeNotification::Roster(e) => e.change,
        }
    }
}

impl DomainEvent for ChangeNotification {
    fn event_id(&self) -> Uuid {
        match self {
            ChangeNotification::Auth(e) => e.event_id(),
            ChangeNotification::Lists(e) => e.event_id(),
            ChangeNotification::Roster(e) => e.event_id(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ChangeNotification::Auth(e) => e.occurred_at(),
            ChangeNotification::Lists(e) => e.occurred_at(),
            ChangeNotification::Roster(e) => e.occurred_at(),
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            ChangeNotification::Auth(e) => e.event_type(),
            ChangeNotification::Lists(e) => e.event_type(),
            ChangeNotification::Roster(e) => e.event_type(),
        }
    }
}

impl From<AuthChanged> for ChangeNotification {
    fn from(event: AuthChanged) -> Self {
        ChangeNotification::Auth(event)
    }
}

impl From<ListsChanged> for ChangeNotification {
    fn from(event: ListsChanged) -> Self {
        ChangeNotification::Lists(event)
    }
}

impl From<RosterChanged> for ChangeNotification {
    fn from(event: RosterChanged) -> Self {
        ChangeNotification::Roster(event)
    }
}
