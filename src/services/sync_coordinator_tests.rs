// src/services/sync_coordinator_tests.rs
//
// Sync coordinator behavior against a mocked store (call counts) and the
// in-memory store (full echo flow).
//
// INVARIANTS TESTED:
// - A second add of the same movie before the echo makes no network call
// - Removing a different value for that movie keeps the add in flight
// - Removing a movie that was never added is a no-op
// - List mutations outside a tokio runtime fail instead of panicking
// - Session lists only change when the store echoes the document
// - A failed add clears its in-flight marker and publishes nothing
// - A blank username never reaches the store
// - Privacy changes are visible as soon as the write succeeds
// - The roster excludes private users and the signed-in user

#[cfg(test)]
mod mocked_store_tests {
    use std::sync::Arc;

    use crate::domain::{MovieEntry, MovieList, UserRecord};
    use crate::error::AppError;
    use crate::events::{ChangeBus, Interest};
    use crate::integrations::remote_store::{AuthIdentity, MockRemoteStore};
    use crate::services::SyncCoordinator;
    use crate::session::SessionStore;

    fn coordinator(store: MockRemoteStore) -> SyncCoordinator {
        let session = SessionStore::new();
        let bus = Arc::new(ChangeBus::new(Arc::new(session.clone())));
        SyncCoordinator::new(Arc::new(store), session, bus)
    }

    fn signed_in(coordinator: &SyncCoordinator) {
        coordinator.session().begin(
            AuthIdentity {
                uid: "uid-1".to_string(),
                email: "alice@example.com".to_string(),
            },
            UserRecord::new("uid-1", "alice99"),
        );
    }

    #[tokio::test]
    async fn test_second_add_before_echo_makes_no_network_call() {
        let mut store = MockRemoteStore::new();
        store
            .expect_array_union()
            .withf(|_, list, entry| *list == MovieList::Watched && entry.movie_id == 7)
            .times(1)
            .returning(|_, _, _| Ok(()));
        let coordinator = coordinator(store);
        signed_in(&coordinator);

        let first = coordinator
            .add_watched(MovieEntry::watched(7, Some(4), None))
            .unwrap();
        let second = coordinator.add_watched(MovieEntry::watched(7, Some(2), None));

        assert!(matches!(
            second,
            Err(AppError::AlreadyPresent { list: MovieList::Watched, movie_id: 7 })
        ));
        first.confirmed().await.unwrap();

        // No echo from the mock: the session lists are untouched
        assert!(coordinator.session().list(MovieList::Watched).is_empty());
    }

    #[tokio::test]
    async fn test_remove_of_other_value_keeps_addition_in_flight() {
        let mut store = MockRemoteStore::new();
        store
            .expect_array_union()
            .withf(|_, list, entry| *list == MovieList::Watched && entry.movie_id == 5)
            .times(2)
            .returning(|_, _, _| Ok(()));
        store
            .expect_array_remove()
            .times(2)
            .returning(|_, _, _| Ok(()));
        let coordinator = coordinator(store);
        signed_in(&coordinator);
        let sent = MovieEntry::watched(5, Some(4), None);

        coordinator.add_watched(sent.clone()).unwrap().confirmed().await.unwrap();
        coordinator
            .remove_watched(MovieEntry::watched(5, Some(2), None))
            .unwrap()
            .confirmed()
            .await
            .unwrap();

        // No echo yet and the value sent is still pending
        assert!(matches!(
            coordinator.add_watched(MovieEntry::watched(5, Some(3), None)),
            Err(AppError::AlreadyPresent { list: MovieList::Watched, movie_id: 5 })
        ));
        assert!(coordinator.session().has_pending_addition(MovieList::Watched, 5));

        // Removing the value that was sent cancels the pending addition
        coordinator.remove_watched(sent).unwrap().confirmed().await.unwrap();
        assert!(!coordinator.session().has_pending_addition(MovieList::Watched, 5));
        coordinator
            .add_watched(MovieEntry::watched(5, Some(3), None))
            .unwrap()
            .confirmed()
            .await
            .unwrap();
    }

    #[test]
    fn test_list_mutation_outside_runtime_is_an_error() {
        // No expectations: any store call would panic
        let coordinator = coordinator(MockRemoteStore::new());
        signed_in(&coordinator);

        assert!(matches!(coordinator.add_to_watch(1), Err(AppError::Other(_))));
        assert!(matches!(
            coordinator.remove_to_watch(MovieEntry::to_watch(1)),
            Err(AppError::Other(_))
        ));
        assert!(!coordinator.session().has_pending_addition(MovieList::ToWatch, 1));
    }

    #[tokio::test]
    async fn test_blank_username_never_reaches_the_store() {
        // No expectations: any store call would panic
        let coordinator = coordinator(MockRemoteStore::new());
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        coordinator.subscribe(Interest::Auth, move |notification| {
            let _ = sender.send(notification.clone());
        });

        let result = coordinator.register("bob@example.com", "secret1", "   ").await;

        assert!(matches!(result, Err(AppError::Validation(ref msg)) if msg == "A username must be provided"));

        // Replayed snapshot first, then the failure
        let replay = receiver.recv().await.unwrap();
        let failure = receiver.recv().await.unwrap();
        match (replay, failure) {
            (
                crate::events::ChangeNotification::Auth(replay),
                crate::events::ChangeNotification::Auth(failure),
            ) => {
                assert!(!replay.signed_in);
                assert!(!failure.signed_in);
                assert_eq!(failure.error.as_deref(), Some("A username must be provided"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_mutation_requires_sign_in() {
        let coordinator = coordinator(MockRemoteStore::new());

        assert!(matches!(coordinator.add_to_watch(1), Err(AppError::NotSignedIn)));
        assert!(matches!(
            coordinator.remove_to_watch(MovieEntry::to_watch(1)),
            Err(AppError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_review_score_is_validated_before_any_call() {
        let coordinator = coordinator(MockRemoteStore::new());
        signed_in(&coordinator);

        let result = coordinator.add_watched(MovieEntry::watched(7, Some(9), None));

        assert!(matches!(result, Err(AppError::Domain(_))));
        assert!(!coordinator.session().has_pending_addition(MovieList::Watched, 7));
    }

    #[tokio::test]
    async fn test_privacy_is_cached_as_soon_as_the_write_succeeds() {
        let mut store = MockRemoteStore::new();
        store
            .expect_set_privacy()
            .withf(|uid, is_private| uid == "uid-1" && *is_private)
            .times(1)
            .returning(|_, _| Ok(()));
        let coordinator = coordinator(store);
        signed_in(&coordinator);

        coordinator.set_privacy(true).await.unwrap();

        assert!(coordinator.session().is_private());
    }

    #[tokio::test]
    async fn test_failed_privacy_write_keeps_cached_flag() {
        let mut store = MockRemoteStore::new();
        store
            .expect_set_privacy()
            .returning(|_, _| Err(AppError::Network("offline".to_string())));
        let coordinator = coordinator(store);
        signed_in(&coordinator);

        assert!(coordinator.set_privacy(true).await.is_err());
        assert!(!coordinator.session().is_private());
    }
}

#[cfg(test)]
mod in_memory_store_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::domain::{MovieEntry, MovieList, UserRecord};
    use crate::error::AppError;
    use crate::events::{ChangeBus, ChangeNotification, Interest};
    use crate::integrations::remote_store::{InMemoryRemoteStore, RemoteStore};
    use crate::services::SyncCoordinator;
    use crate::session::SessionStore;

    fn coordinator(store: Arc<InMemoryRemoteStore>) -> SyncCoordinator {
        let session = SessionStore::new();
        let bus = Arc::new(ChangeBus::new(Arc::new(session.clone())));
        SyncCoordinator::new(store, session, bus)
    }

    fn listen(
        coordinator: &SyncCoordinator,
        interest: Interest,
    ) -> UnboundedReceiver<ChangeNotification> {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        coordinator.subscribe(interest, move |notification| {
            let _ = sender.send(notification.clone());
        });
        receiver
    }

    async fn next(receiver: &mut UnboundedReceiver<ChangeNotification>) -> ChangeNotification {
        tokio::time::timeout(Duration::from_secs(2), receiver.recv())
            .await
            .expect("timed out waiting for a notification")
            .expect("bus dropped")
    }

    /// Wait for the lists notification satisfying `predicate`
    async fn lists_until<F>(
        receiver: &mut UnboundedReceiver<ChangeNotification>,
        predicate: F,
    ) -> (Vec<MovieEntry>, Vec<MovieEntry>)
    where
        F: Fn(&[MovieEntry], &[MovieEntry]) -> bool,
    {
        loop {
            if let ChangeNotification::Lists(lists) = next(receiver).await {
                if predicate(&lists.movies_watched, &lists.movies_to_watch) {
                    return (lists.movies_watched, lists.movies_to_watch);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_register_creates_public_user_and_publishes_sign_in() {
        let store = Arc::new(InMemoryRemoteStore::new());
        let coordinator = coordinator(store.clone());
        let mut auth = listen(&coordinator, Interest::Auth);
        next(&mut auth).await; // replay

        coordinator
            .register("alice@example.com", "secret1", "alice99")
            .await
            .unwrap();

        let uid = coordinator.session().current_uid().unwrap();
        let document = store.document(&uid).unwrap();
        assert_eq!(document.username, "alice99");
        assert!(!document.is_private);
        assert!(document.movies_watched.is_empty());
        assert!(document.movies_to_watch.is_empty());

        match next(&mut auth).await {
            ChangeNotification::Auth(auth) => {
                assert!(auth.signed_in);
                assert!(auth.error.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_is_applied_only_through_the_echo() {
        let store = Arc::new(InMemoryRemoteStore::new());
        let coordinator = coordinator(store.clone());
        coordinator
            .register("alice@example.com", "secret1", "alice99")
            .await
            .unwrap();
        let mut lists = listen(&coordinator, Interest::Lists);

        let pending = coordinator.add_to_watch(603).unwrap();
        pending.confirmed().await.unwrap();

        let (_, to_watch) = lists_until(&mut lists, |_, to_watch| !to_watch.is_empty()).await;
        assert_eq!(to_watch, vec![MovieEntry::to_watch(603)]);
        assert_eq!(coordinator.session().list(MovieList::ToWatch), to_watch);
        assert!(!coordinator.session().has_pending_addition(MovieList::ToWatch, 603));

        // Now cached: rejected locally
        assert!(matches!(
            coordinator.add_to_watch(603),
            Err(AppError::AlreadyPresent { .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_then_echo_empties_the_list() {
        let store = Arc::new(InMemoryRemoteStore::new());
        let coordinator = coordinator(store.clone());
        coordinator
            .register("alice@example.com", "secret1", "alice99")
            .await
            .unwrap();
        let mut lists = listen(&coordinator, Interest::Lists);
        let entry = MovieEntry::watched(11, Some(5), Some("Loved it".to_string()));

        coordinator.add_watched(entry.clone()).unwrap().confirmed().await.unwrap();
        lists_until(&mut lists, |watched, _| !watched.is_empty()).await;

        coordinator.remove_watched(entry).unwrap().confirmed().await.unwrap();
        let (watched, _) = lists_until(&mut lists, |watched, _| watched.is_empty()).await;

        assert!(watched.is_empty());
        assert!(coordinator.session().list(MovieList::Watched).is_empty());
    }

    #[tokio::test]
    async fn test_removing_absent_movie_is_a_no_op() {
        let store = Arc::new(InMemoryRemoteStore::new());
        let coordinator = coordinator(store.clone());
        coordinator
            .register("alice@example.com", "secret1", "alice99")
            .await
            .unwrap();
        let mut auth = listen(&coordinator, Interest::Auth);
        next(&mut auth).await; // replay
        let mut lists = listen(&coordinator, Interest::Lists);
        let kept = MovieEntry::watched(11, Some(5), None);
        coordinator.add_watched(kept.clone()).unwrap().confirmed().await.unwrap();
        lists_until(&mut lists, |watched, _| !watched.is_empty()).await;

        let result = coordinator
            .remove_watched(MovieEntry::watched(99, None, None))
            .unwrap()
            .confirmed()
            .await;

        assert!(result.is_ok());
        let (watched, to_watch) = lists_until(&mut lists, |_, _| true).await;
        assert_eq!(watched, vec![kept.clone()]);
        assert!(to_watch.is_empty());
        assert_eq!(coordinator.session().list(MovieList::Watched), vec![kept]);
        assert!(auth.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_add_clears_marker_and_publishes_nothing() {
        let store = Arc::new(InMemoryRemoteStore::new());
        let coordinator = coordinator(store.clone());
        coordinator
            .register("alice@example.com", "secret1", "alice99")
            .await
            .unwrap();
        // Let the initial echo settle
        tokio::time::sleep(Duration::from_millis(50)).await;
        let published_before = coordinator.bus().publish_log().len();

        store.set_offline(true);
        let result = coordinator.add_to_watch(42).unwrap().confirmed().await;

        assert!(matches!(result, Err(AppError::Network(_))));
        assert!(!coordinator.session().has_pending_addition(MovieList::ToWatch, 42));
        assert!(coordinator.session().list(MovieList::ToWatch).is_empty());
        assert_eq!(coordinator.bus().publish_log().len(), published_before);

        // The movie can be added again once the store is reachable
        store.set_offline(false);
        assert!(coordinator.add_to_watch(42).is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_echo_is_collapsed() {
        let store = Arc::new(InMemoryRemoteStore::new());
        let coordinator = coordinator(store.clone());
        coordinator
            .register("alice@example.com", "secret1", "alice99")
            .await
            .unwrap();
        let uid = coordinator.session().current_uid().unwrap();
        let mut lists = listen(&coordinator, Interest::Lists);

        // Another client wrote the same movie twice with different reviews
        let mut record = UserRecord::new(uid.clone(), "alice99");
        record.movies_watched = vec![
            MovieEntry::watched(5, Some(4), None),
            MovieEntry::watched(5, Some(1), None),
        ];
        store.insert_document(record);

        let (watched, _) = lists_until(&mut lists, |watched, _| !watched.is_empty()).await;
        assert_eq!(watched, vec![MovieEntry::watched(5, Some(4), None)]);
        // No write-back of the collapsed list
        assert_eq!(store.document(&uid).unwrap().movies_watched.len(), 2);
    }

    #[tokio::test]
    async fn test_roster_excludes_private_users_and_self() {
        let store = Arc::new(InMemoryRemoteStore::new());
        let mut hidden = UserRecord::new("uid-hidden", "hidden");
        hidden.is_private = true;
        store.insert_document(hidden);
        store.insert_document(UserRecord::new("uid-bob", "bob"));

        let coordinator = coordinator(store.clone());
        coordinator
            .register("alice@example.com", "secret1", "alice99")
            .await
            .unwrap();

        let roster = coordinator.session().roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].username, "bob");
        assert_eq!(coordinator.refresh_roster().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_failure_publishes_message() {
        let store = Arc::new(InMemoryRemoteStore::new());
        let coordinator = coordinator(store.clone());
        coordinator
            .register("alice@example.com", "secret1", "alice99")
            .await
            .unwrap();
        coordinator.sign_out().await.unwrap();
        let mut auth = listen(&coordinator, Interest::Auth);
        next(&mut auth).await; // replay

        let result = coordinator.sign_in("alice@example.com", "wrong-password").await;

        assert!(matches!(result, Err(AppError::Auth(_))));
        match next(&mut auth).await {
            ChangeNotification::Auth(auth) => {
                assert!(!auth.signed_in);
                assert!(auth.error.unwrap().contains("password is invalid"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sign_in_loads_existing_lists() {
        let store = Arc::new(InMemoryRemoteStore::new());
        let identity = store.create_account("carol@example.com", "secret1").await.unwrap();
        let mut record = UserRecord::new(identity.uid.clone(), "carol");
        record.movies_to_watch.push(MovieEntry::to_watch(77));
        store.create_user(&record).await.unwrap();

        let coordinator = coordinator(store.clone());
        coordinator.sign_in("carol@example.com", "secret1").await.unwrap();

        assert_eq!(
            coordinator.session().list(MovieList::ToWatch),
            vec![MovieEntry::to_watch(77)]
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_and_publishes() {
        let store = Arc::new(InMemoryRemoteStore::new());
        let coordinator = coordinator(store.clone());
        coordinator
            .register("alice@example.com", "secret1", "alice99")
            .await
            .unwrap();
        let mut auth = listen(&coordinator, Interest::Auth);
        next(&mut auth).await; // replay

        coordinator.sign_out().await.unwrap();

        assert!(!coordinator.session().is_signed_in());
        match next(&mut auth).await {
            ChangeNotification::Auth(auth) => assert!(!auth.signed_in),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_password_reset_is_forwarded() {
        let store = Arc::new(InMemoryRemoteStore::new());
        let coordinator = coordinator(store.clone());
        coordinator
            .register("alice@example.com", "secret1", "alice99")
            .await
            .unwrap();

        coordinator.send_password_reset("alice@example.com").await.unwrap();

        assert_eq!(store.password_resets(), vec!["alice@example.com".to_string()]);
        assert!(matches!(
            coordinator.send_password_reset("").await,
            Err(AppError::Validation(_))
        ));
    }
}
