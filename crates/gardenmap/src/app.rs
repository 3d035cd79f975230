use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        garden::{create_garden_items, delete_garden_items, list_garden, update_garden_items},
        health::{livez, readyz},
        plants::{create_plants, list_plants, update_plant},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let data_routes = Router::new()
        .route(
            "/plants",
            get(list_plants).post(create_plants).put(update_plant),
        )
        .route(
            "/garden",
            get(list_garden)
                .post(create_garden_items)
                .put(update_garden_items)
                .delete(delete_garden_items),
        )
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(cors);

    Router::new()
        .merge(data_routes)
        .route("/livez", get(livez))
        .route("/readyz", get(readyz))
        .layer(TraceLayer::new_for_http())
        // Store calls can wait up to the lock timeout; leave room above it.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .with_state(state)
}
