// src/events/bus/change_bus.rs
//
// Multicast change bus between the sync layer and the screens.
//
// DESIGN PRINCIPLES:
// 1. Synchronous - handlers execute immediately in registration order
// 2. Replay - a new subscriber is handed the current state right away,
//    and anything published meanwhile reaches it after the replay
// 3. Isolated - a panicking handler never stops delivery to the others
// 4. Observable - every publish is logged

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::events::types::{Category, ChangeNotification, DomainEvent, Interest};

/// Shared subscriber callback
type Handler = Arc<dyn Fn(&ChangeNotification) + Send + Sync>;

/// Notifications held back while a subscriber is being replayed.
/// `None` once the subscriber is live.
type Backlog = Arc<Mutex<Option<Vec<ChangeNotification>>>>;

/// Entries kept in the publish log before the oldest are dropped
const PUBLISH_LOG_CAPACITY: usize = 256;

/// Provides the current state replayed to new subscribers
pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self, category: Category) -> ChangeNotification;
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

struct Subscription {
    id: SubscriptionId,
    interest: Interest,
    handler: Handler,
    backlog: Backlog,
}

/// A logged publish for debugging and tracing
#[derive(Debug, Clone)]
pub struct PublishLogEntry {
    pub event_type: String,
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub delivered_to: usize,
}

/// The Change Bus
///
/// Screens register interest in auth, lists, roster or all changes.
/// The sync coordinator publishes; the bus fans out.
pub struct ChangeBus {
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
    source: Arc<dyn SnapshotSource>,
    publish_log: Arc<RwLock<VecDeque<PublishLogEntry>>>,
}

impl ChangeBus {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            subscriptions: Arc::new(RwLock::new(Vec::new())),
            source,
            publish_log: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    /// Register a subscriber.
    ///
    /// Before returning, the handler receives one snapshot notification per
    /// category its interest matches (auth, lists, roster order), so a late
    /// screen is never left uninitialized.
    ///
    /// The snapshot is read while the subscriber is registered, and
    /// notifications published before the replay is done are queued and
    /// delivered after it, so the replay never overwrites newer state.
    pub fn subscribe<F>(&self, interest: Interest, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeNotification) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        let handler: Handler = Arc::new(handler);
        let backlog: Backlog = Arc::new(Mutex::new(Some(Vec::new())));

        let snapshots: Vec<ChangeNotification> = {
            let mut subscriptions = self
                .subscriptions
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            subscriptions.push(Subscription {
                id,
                interest,
                handler: Arc::clone(&handler),
                backlog: Arc::clone(&backlog),
            });
            Category::ALL
                .into_iter()
                .filter(|category| interest.matches(*category))
                .map(|category| self.source.snapshot(category))
                .collect()
        };

        log::debug!("[BUS] subscribed {:?} with interest {:?}", id, interest);

        for snapshot in &snapshots {
            Self::deliver(&handler, snapshot, 0);
        }
        Self::drain_backlog(&handler, &backlog);

        id
    }

    /// Deliver what was queued during the replay, then mark the subscriber live
    fn drain_backlog(handler: &Handler, backlog: &Backlog) {
        loop {
            let queued = {
                let mut backlog = backlog.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                match backlog.as_mut() {
                    Some(queued) if !queued.is_empty() => std::mem::take(queued),
                    _ => {
                        *backlog = None;
                        return;
                    }
                }
            };
            log::debug!("[BUS] delivering {} notification(s) held during replay", queued.len());
            for notification in &queued {
                Self::deliver(handler, notification, 0);
            }
        }
    }

    /// Remove a subscriber. Unknown ids are ignored.
    ///
    /// Returns whether a subscription was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self
            .subscriptions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = subscriptions.len();
        subscriptions.retain(|subscription| subscription.id != id);
        before != subscriptions.len()
    }

    /// Deliver a notification to every matching subscriber, in registration order.
    ///
    /// Handlers run outside the registry lock, so they may subscribe or
    /// unsubscribe. If a handler panics, the panic is caught and logged and
    /// the remaining handlers still run.
    pub fn publish(&self, notification: impl Into<ChangeNotification>) {
        let notification = notification.into();
        let category = notification.category();

        let handlers: Vec<(Handler, Backlog)> = self
            .subscriptions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|subscription| subscription.interest.matches(category))
            .map(|subscription| {
                (
                    Arc::clone(&subscription.handler),
                    Arc::clone(&subscription.backlog),
                )
            })
            .collect();

        let entry = PublishLogEntry {
            event_type: notification.event_type().to_string(),
            event_id: notification.event_id(),
            occurred_at: notification.occurred_at(),
            delivered_to: handlers.len(),
        };

        log::debug!(
            "[BUS] {} (id: {}) | {} subscribers",
            entry.event_type,
            entry.event_id,
            entry.delivered_to
        );

        {
            let mut publish_log = self
                .publish_log
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if publish_log.len() == PUBLISH_LOG_CAPACITY {
                publish_log.pop_front();
            }
            publish_log.push_back(entry);
        }

        for (idx, (handler, backlog)) in handlers.iter().enumerate() {
            let held = {
                let mut backlog = backlog.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                match backlog.as_mut() {
                    Some(queued) => {
                        queued.push(notification.clone());
                        true
                    }
                    None => false,
                }
            };
            if !held {
                Self::deliver(handler, &notification, idx);
            }
        }
    }

    fn deliver(handler: &Handler, notification: &ChangeNotification, idx: usize) {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            handler(notification);
        }));

        if let Err(e) = result {
            log::error!(
                "[BUS] subscriber {} for {} panicked: {:?}",
                idx,
                notification.event_type(),
                e
            );
        }
    }

    /// Get the publish log (for debugging)
    pub fn publish_log(&self) -> Vec<PublishLogEntry> {
        self.publish_log
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

// Cloning shares the registry
impl Clone for ChangeBus {
    fn clone(&self) -> Self {
        Self {
            subscriptions: Arc::clone(&self.subscriptions),
            source: Arc::clone(&self.source),
            publish_log: Arc::clone(&self.publish_log),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MovieEntry, UserRecord};
    use crate::events::types::{AuthChanged, ChangeKind, ListsChanged, RosterChanged};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedSource;

    impl SnapshotSource for FixedSource {
        fn snapshot(&self, category: Category) -> ChangeNotification {
            match category {
                Category::Auth => AuthChanged::signed_out().into(),
                Category::Lists => {
                    ListsChanged::new(ChangeKind::Updated, vec![MovieEntry::to_watch(1)], Vec::new()).into()
                }
                Category::Roster => {
                    RosterChanged::new(ChangeKind::Updated, vec![UserRecord::new("u", "bob")]).into()
                }
            }
        }
    }

    fn bus() -> ChangeBus {
        ChangeBus::new(Arc::new(FixedSource))
    }

    fn recorder() -> (Arc<Mutex<Vec<ChangeNotification>>>, impl Fn(&ChangeNotification) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |n: &ChangeNotification| sink.lock().unwrap().push(n.clone()))
    }

    #[test]
    fn test_subscribe_replays_matching_categories() {
        let bus = bus();

        let (lists_seen, lists_handler) = recorder();
        bus.subscribe(Interest::Lists, lists_handler);
        let lists_seen = lists_seen.lock().unwrap();
        assert_eq!(lists_seen.len(), 1);
        assert_eq!(lists_seen[0].category(), Category::Lists);

        let (all_seen, all_handler) = recorder();
        bus.subscribe(Interest::All, all_handler);
        let categories: Vec<Category> = all_seen.lock().unwrap().iter().map(|n| n.category()).collect();
        assert_eq!(categories, vec![Category::Auth, Category::Lists, Category::Roster]);
    }

    #[test]
    fn test_publish_reaches_matching_subscribers_in_order() {
        let bus = bus();
        let sequence = Arc::new(Mutex::new(Vec::new()));

        for tag in 1..=3 {
            let seq = Arc::clone(&sequence);
            bus.subscribe(Interest::Roster, move |n| {
                if n.change() == ChangeKind::Added {
                    seq.lock().unwrap().push(tag);
                }
            });
        }
        let seq = Arc::clone(&sequence);
        bus.subscribe(Interest::Auth, move |_| seq.lock().unwrap().push(99));
        sequence.lock().unwrap().clear();

        bus.publish(RosterChanged::new(ChangeKind::Added, Vec::new()));

        assert_eq!(*sequence.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_each_publish_delivered_once_in_publish_order() {
        let bus = bus();
        let (seen, handler) = recorder();
        bus.subscribe(Interest::Auth, handler);
        seen.lock().unwrap().clear();

        let first = AuthChanged::signed_in();
        let second = AuthChanged::signed_out();
        bus.publish(first.clone());
        bus.publish(second.clone());

        let expected: Vec<ChangeNotification> = vec![first.into(), second.into()];
        assert_eq!(*seen.lock().unwrap(), expected);
    }

    #[test]
    fn test_unsubscribe_stops_delivery_and_ignores_unknown_ids() {
        let bus = bus();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let id = bus.subscribe(Interest::Auth, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(!bus.unsubscribe(SubscriptionId(Uuid::new_v4())));

        bus.publish(AuthChanged::signed_in());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_handler_panic_doesnt_break_bus() {
        let bus = bus();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe(Interest::Lists, |n| {
            if n.change() == ChangeKind::Removed {
                panic!("Intentional panic");
            }
        });

        let c = Arc::clone(&counter);
        bus.subscribe(Interest::Lists, move |n| {
            if n.change() == ChangeKind::Removed {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        bus.publish(ListsChanged::new(ChangeKind::Removed, Vec::new(), Vec::new()));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself_during_publish() {
        let bus = bus();
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let inner_bus = bus.clone();
        let inner_slot = Arc::clone(&slot);
        let id = bus.subscribe(Interest::Auth, move |n| {
            if n.change() == ChangeKind::Added {
                if let Some(id) = *inner_slot.lock().unwrap() {
                    inner_bus.unsubscribe(id);
                }
            }
        });
        *slot.lock().unwrap() = Some(id);

        bus.publish(AuthChanged::new(ChangeKind::Added, true, None));

        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_during_replay_arrives_after_the_snapshots() {
        let bus = bus();
        let (seen, record) = recorder();
        let inner_bus = bus.clone();
        let published = Arc::new(AtomicUsize::new(0));

        bus.subscribe(Interest::All, move |n| {
            record(n);
            // First replayed snapshot: a newer roster is published meanwhile
            if published.fetch_add(1, Ordering::SeqCst) == 0 {
                inner_bus.publish(RosterChanged::new(ChangeKind::Added, Vec::new()));
            }
        });

        let order: Vec<(Category, ChangeKind)> = seen
            .lock()
            .unwrap()
            .iter()
            .map(|n| (n.category(), n.change()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Category::Auth, ChangeKind::Updated),
                (Category::Lists, ChangeKind::Updated),
                (Category::Roster, ChangeKind::Updated),
                (Category::Roster, ChangeKind::Added),
            ]
        );

        // Live afterwards: delivered directly
        bus.publish(AuthChanged::signed_in());
        assert_eq!(seen.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_publish_log_records_emissions() {
        let bus = bus();
        bus.subscribe(Interest::All, |_| {});

        bus.publish(AuthChanged::signed_in());
        bus.publish(RosterChanged::new(ChangeKind::Updated, Vec::new()));

        let log = bus.publish_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].event_type, "AuthChanged");
        assert_eq!(log[1].event_type, "RosterChanged");
        assert_eq!(log[1].delivered_to, 1);
    }
}
