use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use runtime::FacilityConfig;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};
use url::Url;

use crate::api::rest::{openapi::FacilityBookingDoc, routes};
use crate::contract::client::FacilityBookingApi;
use crate::contract::model::MemberProfile;
use crate::domain::ports::{Clock, MemberDirectory};
use crate::domain::service::{Repositories, Service, ServiceConfig};
use crate::gateways::local::FacilityBookingLocalClient;
use crate::infra::members::{HttpMemberDirectory, InMemoryMemberDirectory};
use crate::infra::storage::{migrations::Migrator, SeaOrmFacilityRepository};

const MEMBER_DIRECTORY_TIMEOUT: Duration = Duration::from_secs(5);

/// Facility booking module: owns the domain service and hands out its REST
/// routes, OpenAPI document and in-process client.
#[derive(Clone)]
pub struct FacilityBooking {
    service: Arc<Service>,
}

impl FacilityBooking {
    /// Run migrations and wire storage, member directory and clock into the service.
    pub async fn init(
        db: DatabaseConnection,
        cfg: &FacilityConfig,
        members: Arc<dyn MemberDirectory>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        info!("Initializing facility_booking module");

        Self::migrate(&db).await?;

        let config = ServiceConfig::new(&cfg.token_secret, cfg.utc_offset_minutes)
            .context("invalid facility configuration")?;

        let repo = Arc::new(SeaOrmFacilityRepository::new(db));
        let repos = Repositories {
            settings: repo.clone(),
            reservations: repo.clone(),
            attendance: repo,
        };
        let service = Service::new(repos, members, clock, config);

        info!(
            utc_offset_minutes = cfg.utc_offset_minutes,
            "facility_booking module initialized"
        );
        Ok(Self {
            service: Arc::new(service),
        })
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running facility_booking database migrations");
        Migrator::up(db, None)
            .await
            .context("facility_booking migrations failed")?;
        info!("facility_booking database migrations completed successfully");
        Ok(())
    }

    /// Choose the member directory named by the configuration.
    pub fn member_directory(cfg: &FacilityConfig) -> anyhow::Result<Arc<dyn MemberDirectory>> {
        match cfg.member_directory_url.as_deref() {
            Some(raw) => {
                let base = Url::parse(raw)
                    .with_context(|| format!("invalid facility.member_directory_url '{raw}'"))?;
                let client = reqwest::Client::builder()
                    .timeout(MEMBER_DIRECTORY_TIMEOUT)
                    .build()
                    .context("failed to build member directory HTTP client")?;
                if !cfg.members.is_empty() {
                    warn!("facility.members is ignored when member_directory_url is set");
                }
                info!(%base, "Using HTTP member directory");
                Ok(Arc::new(HttpMemberDirectory::new(client, base)))
            }
            None => Ok(Self::in_process_directory(cfg)),
        }
    }

    /// In-process directory holding the profiles listed under `facility.members`.
    pub fn in_process_directory(cfg: &FacilityConfig) -> Arc<dyn MemberDirectory> {
        if cfg.members.is_empty() {
            warn!("No facility.members configured; identity tokens cannot be issued");
        }
        let directory = InMemoryMemberDirectory::new();
        for seed in &cfg.members {
            directory.upsert(MemberProfile {
                id: seed.id,
                name: seed.name.clone(),
                email: seed.email.clone(),
                registration_no: seed.registration_no.clone(),
                index_no: seed.index_no.clone(),
            });
        }
        info!(members = cfg.members.len(), "Using in-process member directory");
        Arc::new(directory)
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering facility_booking REST routes");
        routes::register_routes(router, self.service.clone())
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        use utoipa::OpenApi;
        FacilityBookingDoc::openapi()
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn FacilityBookingApi> {
        Arc::new(FacilityBookingLocalClient::new(self.service.clone()))
    }

    #[doc(hidden)]
    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }
}
