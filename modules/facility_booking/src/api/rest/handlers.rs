use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use problem::{Problem, ProblemResponse};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::rest::dto::{
    parse_date, AddClosedDateReq, AttendanceListDto, AvailabilityDto, BookingSwitchDto,
    ClosedDatesDto, DaySlotQuery, IssuedTokenDto, ReservationDto, ReservationListDto, ReserveReq,
    ScanReq, ScanResultDto, SettingsDto, StatisticsDto, UpdateSettingsReq,
};
use crate::api::rest::error::{map_domain_error, map_json_rejection};
use crate::contract::model::{Principal, ScanOutcome};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

fn reject(e: DomainError, uri: &Uri) -> ProblemResponse {
    if !e.is_infrastructure() {
        warn!(error = %e, "Request rejected");
    }
    map_domain_error(&e, uri.path())
}

fn body<T>(payload: Result<Json<T>, JsonRejection>, uri: &Uri) -> Result<T, ProblemResponse> {
    payload
        .map(|Json(v)| v)
        .map_err(|r| map_json_rejection(&r, uri.path()))
}

/// Get the facility configuration
#[utoipa::path(
    get,
    path = "/facility/v1/settings",
    tag = "facility",
    responses(
        (status = 200, description = "Current configuration", body = SettingsDto),
        (status = 401, description = "Unauthenticated", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_settings(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
) -> Result<Json<SettingsDto>, ProblemResponse> {
    info!(user_id = %principal.id, "Getting facility settings");

    match svc.get_settings().await {
        Ok(settings) => Ok(Json(settings.into())),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// Update the facility configuration (partial)
#[utoipa::path(
    patch,
    path = "/facility/v1/settings",
    tag = "facility",
    request_body = UpdateSettingsReq,
    responses(
        (status = 200, description = "Updated configuration", body = SettingsDto),
        (status = 400, description = "Invalid patch", body = Problem, content_type = "application/problem+json"),
        (status = 403, description = "Staff only", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_settings(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
    payload: Result<Json<UpdateSettingsReq>, JsonRejection>,
) -> Result<Json<SettingsDto>, ProblemResponse> {
    let req = body(payload, &uri)?;
    info!(user_id = %principal.id, "Updating facility settings");

    match svc.update_settings(principal, req.into()).await {
        Ok(settings) => Ok(Json(settings.into())),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// Flip the global booking switch
#[utoipa::path(
    post,
    path = "/facility/v1/settings/toggle-booking",
    tag = "facility",
    responses(
        (status = 200, description = "New switch value", body = BookingSwitchDto),
        (status = 403, description = "Staff only", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn toggle_booking(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
) -> Result<Json<BookingSwitchDto>, ProblemResponse> {
    info!(user_id = %principal.id, "Toggling booking");

    match svc.toggle_booking(principal).await {
        Ok(booking_enabled) => Ok(Json(BookingSwitchDto { booking_enabled })),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// Close the facility on a date
#[utoipa::path(
    post,
    path = "/facility/v1/settings/closed-dates",
    tag = "facility",
    request_body = AddClosedDateReq,
    responses(
        (status = 201, description = "Closed dates after the change", body = ClosedDatesDto),
        (status = 400, description = "Invalid date", body = Problem, content_type = "application/problem+json"),
        (status = 403, description = "Staff only", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Date already closed", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn add_closed_date(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
    payload: Result<Json<AddClosedDateReq>, JsonRejection>,
) -> Result<(StatusCode, Json<ClosedDatesDto>), ProblemResponse> {
    let req = body(payload, &uri)?;
    let date = parse_date("date", &req.date).map_err(|e| reject(e, &uri))?;
    info!(user_id = %principal.id, %date, "Closing date");

    match svc.add_closed_date(principal, date, req.reason).await {
        Ok(list) => Ok((StatusCode::CREATED, Json(list.into()))),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// Reopen a closed date
#[utoipa::path(
    delete,
    path = "/facility/v1/settings/closed-dates/{date}",
    tag = "facility",
    params(("date" = String, Path, description = "Date to reopen, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Remaining closed dates", body = ClosedDatesDto),
        (status = 403, description = "Staff only", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn remove_closed_date(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
    Path(date): Path<String>,
) -> Result<Json<ClosedDatesDto>, ProblemResponse> {
    let date = parse_date("date", &date).map_err(|e| reject(e, &uri))?;
    info!(user_id = %principal.id, %date, "Reopening date");

    match svc.remove_closed_date(principal, date).await {
        Ok(list) => Ok(Json(list.into())),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// Per-slot availability for a date
#[utoipa::path(
    get,
    path = "/facility/v1/availability/{date}",
    tag = "facility",
    params(("date" = String, Path, description = "Calendar date, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Availability by slot", body = AvailabilityDto),
        (status = 400, description = "Invalid date", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn availability(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
    Path(date): Path<String>,
) -> Result<Json<AvailabilityDto>, ProblemResponse> {
    let date = parse_date("date", &date).map_err(|e| reject(e, &uri))?;
    info!(user_id = %principal.id, %date, "Getting availability");

    match svc.availability(date).await {
        Ok(day) => Ok(Json(day.into())),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// Reserve a slot for the caller
#[utoipa::path(
    post,
    path = "/facility/v1/reservations",
    tag = "facility",
    request_body = ReserveReq,
    responses(
        (status = 201, description = "Reservation created", body = ReservationDto),
        (status = 400, description = "Invalid request", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Disabled, closed, full or duplicate", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Past date, outside window or unknown slot", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn reserve(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
    payload: Result<Json<ReserveReq>, JsonRejection>,
) -> Result<(StatusCode, Json<ReservationDto>), ProblemResponse> {
    let req = body(payload, &uri)?;
    let date = parse_date("date", &req.date).map_err(|e| reject(e, &uri))?;
    info!(user_id = %principal.id, %date, slot = %req.slot, "Reserving slot");

    match svc.reserve(principal, date, req.slot).await {
        Ok(reservation) => Ok((StatusCode::CREATED, Json(reservation.into()))),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// The caller's own reservations
#[utoipa::path(
    get,
    path = "/facility/v1/reservations/mine",
    tag = "facility",
    responses((status = 200, description = "Own reservations", body = ReservationListDto))
)]
pub async fn my_reservations(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
) -> Result<Json<ReservationListDto>, ProblemResponse> {
    info!(user_id = %principal.id, "Listing own reservations");

    match svc.my_reservations(principal).await {
        Ok(list) => Ok(Json(list.into())),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// All reservations, optionally narrowed by date and slot
#[utoipa::path(
    get,
    path = "/facility/v1/reservations",
    tag = "facility",
    params(DaySlotQuery),
    responses(
        (status = 200, description = "Reservations ordered by date then slot", body = ReservationListDto),
        (status = 403, description = "Staff only", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_reservations(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
    Query(query): Query<DaySlotQuery>,
) -> Result<Json<ReservationListDto>, ProblemResponse> {
    info!(user_id = %principal.id, ?query, "Listing reservations");
    let filter = query.into_filter().map_err(|e| reject(e, &uri))?;

    match svc.list_reservations(principal, filter).await {
        Ok(list) => Ok(Json(list.into())),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// Cancel a reservation (owner or staff)
#[utoipa::path(
    delete,
    path = "/facility/v1/reservations/{id}",
    tag = "facility",
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses(
        (status = 204, description = "Reservation cancelled"),
        (status = 403, description = "Not the owner", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn cancel_reservation(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
    Path(id): Path<String>,
) -> Result<StatusCode, ProblemResponse> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| reject(DomainError::validation("id", "must be a UUID"), &uri))?;
    info!(user_id = %principal.id, reservation_id = %id, "Cancelling reservation");

    match svc.cancel_reservation(principal, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// Issue a short-lived identity token for the caller
#[utoipa::path(
    post,
    path = "/facility/v1/identity-tokens",
    tag = "facility",
    responses(
        (status = 201, description = "Signed token valid for five minutes", body = IssuedTokenDto),
        (status = 404, description = "Caller unknown to the member directory", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn issue_token(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
) -> Result<(StatusCode, Json<IssuedTokenDto>), ProblemResponse> {
    info!(user_id = %principal.id, "Issuing identity token");

    match svc.issue_token(principal).await {
        Ok(token) => Ok((StatusCode::CREATED, Json(token.into()))),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// Verify a presented token and check its holder in
#[utoipa::path(
    post,
    path = "/facility/v1/check-ins",
    tag = "facility",
    request_body = ScanReq,
    responses(
        (status = 201, description = "Attendance recorded", body = ScanResultDto),
        (status = 409, description = "Already checked in; carries the existing record", body = ScanResultDto),
        (status = 401, description = "Token invalid or expired", body = Problem, content_type = "application/problem+json"),
        (status = 403, description = "Staff only", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "No reservation today", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn scan(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
    payload: Result<Json<ScanReq>, JsonRejection>,
) -> Result<(StatusCode, Json<ScanResultDto>), ProblemResponse> {
    let req = body(payload, &uri)?;
    info!(staff_id = %principal.id, "Scanning identity token");

    match svc.scan(principal, &req.token).await {
        Ok(outcome @ ScanOutcome::Recorded(_)) => Ok((StatusCode::CREATED, Json(outcome.into()))),
        Ok(outcome @ ScanOutcome::AlreadyCheckedIn(_)) => {
            Ok((StatusCode::CONFLICT, Json(outcome.into())))
        }
        Err(e) => Err(reject(e, &uri)),
    }
}

/// Attendance records, newest first
#[utoipa::path(
    get,
    path = "/facility/v1/check-ins",
    tag = "facility",
    params(DaySlotQuery),
    responses(
        (status = 200, description = "Attendance records", body = AttendanceListDto),
        (status = 403, description = "Staff only", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_attendance(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
    Query(query): Query<DaySlotQuery>,
) -> Result<Json<AttendanceListDto>, ProblemResponse> {
    info!(user_id = %principal.id, ?query, "Listing attendance");
    let filter = query.into_filter().map_err(|e| reject(e, &uri))?;

    match svc.list_attendance(principal, filter).await {
        Ok(list) => Ok(Json(list.into())),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// The caller's own attendance history
#[utoipa::path(
    get,
    path = "/facility/v1/check-ins/mine",
    tag = "facility",
    responses((status = 200, description = "Own attendance records", body = AttendanceListDto))
)]
pub async fn my_attendance(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
) -> Result<Json<AttendanceListDto>, ProblemResponse> {
    info!(user_id = %principal.id, "Listing own attendance");

    match svc.my_attendance(principal).await {
        Ok(list) => Ok(Json(list.into())),
        Err(e) => Err(reject(e, &uri)),
    }
}

/// Today's attendance statistics
#[utoipa::path(
    get,
    path = "/facility/v1/statistics",
    tag = "facility",
    responses(
        (status = 200, description = "Statistics for the facility-local day", body = StatisticsDto),
        (status = 403, description = "Staff only", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn statistics(
    Extension(svc): Extension<Arc<Service>>,
    principal: Principal,
    uri: Uri,
) -> Result<Json<StatisticsDto>, ProblemResponse> {
    info!(user_id = %principal.id, "Getting statistics");

    match svc.statistics(principal).await {
        Ok(stats) => Ok(Json(stats.into())),
        Err(e) => Err(reject(e, &uri)),
    }
}
