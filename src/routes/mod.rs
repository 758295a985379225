pub mod auth;
pub mod drones;
pub mod extract;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use auth::{profile, rotate_token, sign_in, sign_up};
pub use drones::{create_drone, delete_drone, get_drone, list_drones, update_drone};
pub use extract::{bearer_token, AppJson, CurrentAccount};
pub use health::health_check;

/// Build the application router
///
/// CORS is left to the caller; request tracing follows `config.log_requests`.
pub fn router(state: AppState) -> Router {
    let log_requests = state.config.log_requests;

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/signup", post(sign_up))
        .route("/api/signin", post(sign_in))
        .route("/api/profile", get(profile))
        .route("/api/token", post(rotate_token))
        .route("/api/drones", post(create_drone).get(list_drones))
        .route(
            "/api/drones/:id",
            get(get_drone).put(update_drone).delete(delete_drone),
        )
        .with_state(state);

    if log_requests {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}
