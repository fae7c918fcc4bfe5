use anyhow::Result;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::config::settings::AppConfig;
use crate::notify::NotifierBackend;
use crate::services::publish::PublishService;
use crate::store::StoreBackend;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let store = StoreBackend::from_config(&self.config)?;
        let notifier = NotifierBackend::from_config(&self.config)?;
        if self.config.publish.admin_password.is_none() {
            log::warn!("ADMIN_PASSWORD is not set, publish endpoints are open");
        }

        let state = Arc::new(AppState {
            service: PublishService::new(self.config.clone(), store, notifier),
        });

        let app = create_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
