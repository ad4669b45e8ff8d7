//! Axum router wiring (HTTP -> WS upgrade, ops endpoints).

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let gw = &state.cfg().gateway;
    let router = Router::new()
        .route(&gw.ws_path, get(transport::ws::ws_upgrade))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics));

    let router = if gw.allow_any_origin {
        router.layer(middleware::map_response(ops::allow_any_origin))
    } else {
        router
    };

    router.with_state(state)
}
