//! JSON HTTP API - thin axum glue over [`crate::core`].
//!
//! Every handler identifies the caller through [`auth::CurrentUser`], calls one
//! core operation and serializes the result. Errors become
//! `{"error": "..."}` bodies with the status code from [`error::status_for`].

use std::{net::SocketAddr, time::Duration};

use axum::{
    Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    routing::{get, post, put},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::errors::Result;

/// Acting-user extractor
pub mod auth;
/// Delivery and dashboard handlers
pub mod deliveries;
/// Error to response mapping
pub mod error;
/// Extractors with JSON error rejections
pub mod extract;
/// Cart and order handlers
pub mod orders;
/// Restaurant and menu handlers
pub mod restaurants;
/// Shared handler state
pub mod state;
/// Account handlers
pub mod users;

pub use state::AppState;

/// Builds the full API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(auth::USER_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            "/api/users",
            get(users::list_users_handler).post(users::create_user_handler),
        )
        .route(
            "/api/users/{id}",
            get(users::get_user_handler)
                .put(users::update_agent_handler)
                .delete(users::delete_agent_handler),
        )
        .route(
            "/api/restaurants",
            get(restaurants::list_restaurants_handler).post(restaurants::create_restaurant_handler),
        )
        .route(
            "/api/restaurants/{id}",
            get(restaurants::get_restaurant_handler)
                .put(restaurants::update_restaurant_handler)
                .delete(restaurants::delete_restaurant_handler),
        )
        .route("/api/restaurants/{id}/menu", get(restaurants::menu_handler))
        .route(
            "/api/menu-items",
            post(restaurants::create_menu_item_handler),
        )
        .route(
            "/api/menu-items/{id}",
            put(restaurants::update_menu_item_handler).delete(restaurants::delete_menu_item_handler),
        )
        .route(
            "/api/cart",
            get(orders::get_cart_handler)
                .put(orders::update_cart_handler)
                .delete(orders::clear_cart_handler),
        )
        .route("/api/cart/items", post(orders::add_to_cart_handler))
        .route(
            "/api/orders",
            get(orders::list_orders_handler).post(orders::checkout_handler),
        )
        .route("/api/orders/{id}", get(orders::order_detail_handler))
        .route("/api/orders/{id}/status", post(orders::change_status_handler))
        .route("/api/orders/{id}/cancel", post(orders::cancel_order_handler))
        .route("/api/deliveries", get(deliveries::my_deliveries_handler))
        .route("/api/deliveries/assign", post(deliveries::assign_handler))
        .route("/api/deliveries/{id}/pickup", post(deliveries::pickup_handler))
        .route("/api/deliveries/{id}/drop", post(deliveries::drop_handler))
        .route(
            "/api/deliveries/{id}/locations",
            post(deliveries::location_handler),
        )
        .route("/api/admin/dashboard", get(deliveries::dashboard_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves the API on `addr` until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Server running on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
