use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::rest::principal::{PRINCIPAL_ID_HEADER, PRINCIPAL_ROLE_HEADER};
use crate::api::rest::{dto, handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_settings,
        handlers::update_settings,
        handlers::toggle_booking,
        handlers::add_closed_date,
        handlers::remove_closed_date,
        handlers::availability,
        handlers::reserve,
        handlers::my_reservations,
        handlers::list_reservations,
        handlers::cancel_reservation,
        handlers::issue_token,
        handlers::scan,
        handlers::list_attendance,
        handlers::my_attendance,
        handlers::statistics,
    ),
    components(schemas(
        dto::SlotDto,
        dto::ClosedDateDto,
        dto::ClosedDateInput,
        dto::SettingsDto,
        dto::UpdateSettingsReq,
        dto::BookingSwitchDto,
        dto::AddClosedDateReq,
        dto::ClosedDatesDto,
        dto::SlotAvailabilityDto,
        dto::AvailabilityDto,
        dto::ReserveReq,
        dto::ReservationDto,
        dto::ReservationListDto,
        dto::IssuedTokenDto,
        dto::ScanReq,
        dto::ScanResult,
        dto::ScanResultDto,
        dto::AttendanceDto,
        dto::AttendanceListDto,
        dto::SlotCountDto,
        dto::StatisticsDto,
        problem::Problem,
        problem::ValidationError,
    )),
    modifiers(&GatewayIdentity),
    tags((name = "facility", description = "Facility slot reservations and attendance"))
)]
pub struct FacilityBookingDoc;

/// Documents the caller headers injected by the identity gateway.
struct GatewayIdentity;

impl Modify for GatewayIdentity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "principal_id",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(PRINCIPAL_ID_HEADER))),
        );
        components.add_security_scheme(
            "principal_role",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(PRINCIPAL_ROLE_HEADER))),
        );
    }
}
