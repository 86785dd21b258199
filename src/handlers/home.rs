use axum::extract::State;

use crate::server::AppState;

/// GET / - plain-text version banner
pub async fn home(State(state): State<AppState>) -> String {
    format!("{}\n", state.version)
}
