// src/application/commands/list_commands.rs

use crate::application::{
    dto::*,
    error_handling::{ErrorResponse, ToErrorResponse},
    state::AppState,
};

/// Lists saved for offline viewing; NotFound when nothing was saved
pub fn get_offline_lists(state: &AppState) -> Result<OfflineListsDto, ErrorResponse> {
    if !state.offline.has_offline_lists().to_error_response()? {
        return Err(ErrorResponse::not_found("Offline list"));
    }

    let snapshot = state.offline.load().to_error_response()?;
    Ok(OfflineListsDto::from(&snapshot))
}

pub fn clear_offline_lists(state: &AppState) -> Result<(), ErrorResponse> {
    state.offline.clear().to_error_response()
}
