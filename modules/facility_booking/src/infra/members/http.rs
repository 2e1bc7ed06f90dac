use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::contract::model::MemberProfile;
use crate::domain::error::DomainError;
use crate::domain::ports::MemberDirectory;

/// Wire shape served by the account service at `GET {base}/members/{id}`.
#[derive(Debug, Deserialize)]
struct MemberResponse {
    id: Uuid,
    name: String,
    email: String,
    #[serde(default)]
    registration_no: Option<String>,
    #[serde(default)]
    index_no: Option<String>,
}

impl From<MemberResponse> for MemberProfile {
    fn from(r: MemberResponse) -> Self {
        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            registration_no: r.registration_no,
            index_no: r.index_no,
        }
    }
}

/// HTTP adapter implementing the MemberDirectory port.
pub struct HttpMemberDirectory {
    client: reqwest::Client,
    base: Url,
}

impl HttpMemberDirectory {
    pub fn new(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }

    fn member_url(&self, id: Uuid) -> Result<Url, DomainError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DomainError::upstream("invalid member directory base URL"))?
            .pop_if_empty()
            .extend(&["members", &id.to_string()]);
        Ok(url)
    }
}

#[async_trait]
impl MemberDirectory for HttpMemberDirectory {
    #[instrument(
        name = "facility_booking.http.members.find",
        skip_all,
        fields(base = %self.base, user_id = %id)
    )]
    async fn find_member(&self, id: Uuid) -> Result<Option<MemberProfile>, DomainError> {
        let url = self.member_url(id)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET /members/{id}"))
            .map_err(|e| DomainError::upstream(format!("{e:#}")))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let body: MemberResponse = response
                    .json()
                    .await
                    .map_err(|e| DomainError::upstream(format!("invalid member payload: {e}")))?;
                Ok(Some(body.into()))
            }
            s => Err(DomainError::upstream(format!("HTTP {s}"))),
        }
    }
}
