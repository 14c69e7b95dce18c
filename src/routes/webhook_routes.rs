use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::post,
};

use crate::{AppState, controllers::webhook_controller};

// the secret check only guards /webhook, /health stays open
pub fn add_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route(
        "/webhook",
        post(webhook_controller::receive_webhook)
            .layer(DefaultBodyLimit::max(state.settings.max_body_bytes))
            .layer(from_fn_with_state(state.clone(), crate::auth::require_webhook_secret)),
    )
}
