//! Route definitions.

use crate::{assets, auth, export, handlers, state::AppState};
use axum::{
    Router, middleware,
    routing::{any, get},
};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let products = Router::new()
        .route("/", get(handlers::show_main))
        .route(
            "/create-product",
            get(handlers::create_product_page).post(handlers::create_product),
        )
        .route(
            "/edit-product/{id}",
            get(handlers::edit_product_page).post(handlers::edit_product),
        )
        .route("/delete-product/{id}", get(handlers::delete_product))
        .route_layer(middleware::from_fn(auth::require_login));

    let public = Router::new()
        .route(
            "/register",
            get(auth::register_page).post(auth::register_submit),
        )
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", get(auth::logout))
        .route("/add-product-ajax", any(handlers::add_product_ajax))
        .route("/json", get(export::show_json))
        .route("/xml", get(export::show_xml))
        .route("/json/{id}", get(export::show_json_by_id))
        .route("/xml/{id}", get(export::show_xml_by_id))
        .route("/static/{*path}", get(assets::static_asset))
        .route("/healthz", get(handlers::healthz));

    products
        .merge(public)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::load_session,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
