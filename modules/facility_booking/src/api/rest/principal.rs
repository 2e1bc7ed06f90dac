use axum::{extract::FromRequestParts, http::request::Parts};
use problem::ProblemResponse;
use uuid::Uuid;

use crate::api::rest::error::UNAUTHENTICATED;
use crate::contract::model::{Principal, Role};

/// Header carrying the authenticated caller id, set by the identity gateway.
pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
/// Header carrying the caller role (`member` or `staff`).
pub const PRINCIPAL_ROLE_HEADER: &str = "x-principal-role";

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let instance = parts.uri.path().to_string();
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let id = header(PRINCIPAL_ID_HEADER)
            .ok_or_else(|| UNAUTHENTICATED.to_response("missing caller identity", &instance))?;
        let id = Uuid::parse_str(id)
            .map_err(|_| UNAUTHENTICATED.to_response("caller id is not a UUID", &instance))?;

        let raw = header(PRINCIPAL_ROLE_HEADER)
            .ok_or_else(|| UNAUTHENTICATED.to_response("missing caller role", &instance))?;
        let role = Role::parse(raw).ok_or_else(|| {
            UNAUTHENTICATED.to_response(format!("unknown caller role '{raw}'"), &instance)
        })?;

        Ok(Principal { id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<Principal, ProblemResponse> {
        let (mut parts, _) = req.into_parts();
        Principal::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn staff_header_yields_staff() {
        let id = Uuid::new_v4();
        let req = Request::builder()
            .uri("/facility/v1/statistics")
            .header(PRINCIPAL_ID_HEADER, id.to_string())
            .header(PRINCIPAL_ROLE_HEADER, "staff")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await.unwrap(), Principal::staff(id));
    }

    #[tokio::test]
    async fn user_role_is_a_member() {
        let id = Uuid::new_v4();
        let req = Request::builder()
            .header(PRINCIPAL_ID_HEADER, id.to_string())
            .header(PRINCIPAL_ROLE_HEADER, "user")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await.unwrap(), Principal::member(id));
    }

    #[tokio::test]
    async fn missing_or_garbled_identity_is_unauthenticated() {
        let req = Request::builder().uri("/a").body(()).unwrap();
        let p = extract(req).await.unwrap_err().0;
        assert_eq!(p.status, 401);
        assert_eq!(p.code, "FACILITY_UNAUTHENTICATED");

        let req = Request::builder()
            .header(PRINCIPAL_ID_HEADER, "nobody")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await.unwrap_err().0.status, 401);

        let req = Request::builder()
            .header(PRINCIPAL_ID_HEADER, Uuid::new_v4().to_string())
            .body(())
            .unwrap();
        assert_eq!(extract(req).await.unwrap_err().0.status, 401);

        let req = Request::builder()
            .header(PRINCIPAL_ID_HEADER, Uuid::new_v4().to_string())
            .header(PRINCIPAL_ROLE_HEADER, "janitor")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await.unwrap_err().0.status, 401);
    }
}
