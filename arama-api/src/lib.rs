use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod enquiries;
pub mod error;
pub mod feeds;
pub mod notifier;
pub mod properties;
pub mod state;

pub use error::AppError;
pub use state::AppState;

pub fn app(state: AppState, allowed_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin(allowed_origin))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::ACCEPT,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ORIGIN,
        ]);

    let admin = Router::new()
        .route("/seasons", get(admin::list_seasons).post(admin::create_season))
        .route(
            "/seasons/{id}",
            put(admin::update_season).delete(admin::delete_season),
        )
        .route(
            "/bedroom-configs",
            get(admin::list_tiers).post(admin::create_tier),
        )
        .route(
            "/bedroom-configs/{id}",
            put(admin::update_tier).delete(admin::delete_tier),
        )
        .route("/enquiries", get(enquiries::list_enquiries))
        .route("/enquiries/export", get(enquiries::export_enquiries))
        .route("/enquiries/{id}/status", put(enquiries::update_status))
        .route("/ical", get(feeds::list_feeds).post(feeds::add_feed))
        .route("/ical/sync", post(feeds::sync_all))
        .route("/ical/{id}", axum::routing::delete(feeds::delete_feed));

    let api = Router::new()
        .route("/properties", get(properties::list_properties))
        .route("/properties/{id}", get(properties::get_property))
        .route("/properties/{id}/pricing", get(properties::get_pricing))
        .route(
            "/properties/{id}/availability",
            get(properties::get_availability),
        )
        .route("/enquiries", post(enquiries::create_enquiry))
        .nest("/admin", admin);

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_origin(allowed: &str) -> AllowOrigin {
    let allowed = allowed.trim();
    if allowed.is_empty() || allowed == "*" {
        return AllowOrigin::any();
    }
    match HeaderValue::from_str(allowed) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            tracing::warn!("Ignoring invalid allowed origin '{}'", allowed);
            AllowOrigin::any()
        }
    }
}
