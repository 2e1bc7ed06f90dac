use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount every facility route on `router` with the service attached.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let facility = Router::new()
        // Configuration store
        .route(
            "/facility/v1/settings",
            get(handlers::get_settings).patch(handlers::update_settings),
        )
        .route(
            "/facility/v1/settings/toggle-booking",
            post(handlers::toggle_booking),
        )
        .route(
            "/facility/v1/settings/closed-dates",
            post(handlers::add_closed_date),
        )
        .route(
            "/facility/v1/settings/closed-dates/{date}",
            delete(handlers::remove_closed_date),
        )
        // Ledger
        .route(
            "/facility/v1/availability/{date}",
            get(handlers::availability),
        )
        .route(
            "/facility/v1/reservations",
            get(handlers::list_reservations).post(handlers::reserve),
        )
        .route(
            "/facility/v1/reservations/mine",
            get(handlers::my_reservations),
        )
        .route(
            "/facility/v1/reservations/{id}",
            delete(handlers::cancel_reservation),
        )
        // Check-in
        .route("/facility/v1/identity-tokens", post(handlers::issue_token))
        .route(
            "/facility/v1/check-ins",
            get(handlers::list_attendance).post(handlers::scan),
        )
        .route("/facility/v1/check-ins/mine", get(handlers::my_attendance))
        .route("/facility/v1/statistics", get(handlers::statistics))
        .layer(Extension(service));

    router.merge(facility)
}
