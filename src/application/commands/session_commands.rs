// src/application/commands/session_commands.rs
//
// Scripted session against the configured remote store: register, fill both
// lists, wait for the store to echo them back, save them for offline use.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::{
    dto::*,
    error_handling::{ErrorResponse, ToErrorResponse},
    state::AppState,
};
use crate::domain::{MovieEntry, MovieList};
use crate::error::{AppError, AppResult};
use crate::events::{ChangeNotification, Interest};

/// How long to wait for the store to echo a change
const ECHO_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionScript {
    pub email: String,
    pub password: String,
    pub username: String,
    /// (movie id, review score)
    pub watched: Vec<(i64, Option<u8>)>,
    pub to_watch: Vec<i64>,
    pub make_private: bool,
}

pub async fn run_session_script(
    state: &AppState,
    script: &SessionScript,
) -> Result<SessionSummaryDto, ErrorResponse> {
    state
        .sync
        .register(&script.email, &script.password, &script.username)
        .await
        .to_error_response()?;

    let mut pending = Vec::new();
    for (movie_id, score) in &script.watched {
        match state.sync.add_watched(MovieEntry::watched(*movie_id, *score, None)) {
            Ok(write) => pending.push(write),
            Err(err @ AppError::AlreadyPresent { .. }) => log::info!("Skipping: {}", err),
            Err(err) => return Err(ErrorResponse::from_app_error(err)),
        }
    }
    for movie_id in &script.to_watch {
        match state.sync.add_to_watch(*movie_id) {
            Ok(write) => pending.push(write),
            Err(err @ AppError::AlreadyPresent { .. }) => log::info!("Skipping: {}", err),
            Err(err) => return Err(ErrorResponse::from_app_error(err)),
        }
    }
    for write in pending {
        write.confirmed().await.to_error_response()?;
    }

    let expected = (
        distinct(script.watched.iter().map(|(id, _)| *id)),
        distinct(script.to_watch.iter().copied()),
    );
    wait_for_lists(state, expected).await.to_error_response()?;

    if script.make_private {
        state.sync.set_privacy(true).await.to_error_response()?;
    }
    state.sync.refresh_roster().await.to_error_response()?;

    for list in MovieList::ALL {
        state.offline.save_list(list).to_error_response()?;
    }

    Ok(SessionSummaryDto::from(&state.session))
}

pub async fn sign_out(state: &AppState) -> Result<(), ErrorResponse> {
    state.sync.sign_out().await.to_error_response()
}

pub fn last_email(state: &AppState) -> Result<Option<String>, ErrorResponse> {
    state.preferences.last_email().to_error_response()
}

fn distinct(ids: impl Iterator<Item = i64>) -> usize {
    ids.collect::<std::collections::HashSet<_>>().len()
}

/// Wait until the session lists have the expected (watched, to watch) sizes
async fn wait_for_lists(state: &AppState, expected: (usize, usize)) -> AppResult<()> {
    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    let subscription = state.sync.subscribe(Interest::Lists, move |notification| {
        if let ChangeNotification::Lists(lists) = notification {
            let _ = sender.send((lists.movies_watched.len(), lists.movies_to_watch.len()));
        }
    });

    let reached = tokio::time::timeout(ECHO_TIMEOUT, async {
        while let Some(counts) = receiver.recv().await {
            if counts == expected {
                return true;
            }
        }
        false
    })
    .await;
    state.sync.unsubscribe(subscription);

    match reached {
        Ok(true) => Ok(()),
        _ => Err(AppError::Store(
            "Timed out waiting for the store to confirm the lists".to_string(),
        )),
    }
}
