use crate::config::Settings;
use crate::proxy::types::ProxyOrigin;
use crate::proxy::{ProxyConfig, ProxyService};
use crate::registry::StaticChannelRegistry;
use crate::Result;
use std::sync::Arc;
use tracing::{info, instrument};

/// Main application struct that coordinates all components
pub struct Application {
    settings: Settings,
    router: axum::Router,
}

impl Application {
    #[instrument]
    pub async fn new() -> Result<Self> {
        let settings = Settings::new()?;

        let registry = StaticChannelRegistry::from_file(&settings.registry.channels_file)?;
        info!(
            channels = registry.len(),
            file = %settings.registry.channels_file,
            "channel registry loaded"
        );

        let proxy_config = ProxyConfig {
            upstream_timeout: settings.upstream_timeout(),
            default_user_agent: settings.upstream.user_agent.clone(),
        };
        let public_origin = settings
            .application
            .public_origin
            .clone()
            .map(ProxyOrigin::from);

        let service = ProxyService::new(proxy_config, Arc::new(registry), public_origin)?;
        let router = service.into_router();

        Ok(Self { settings, router })
    }

    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        let addr = self.settings.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Streamgate listening on {addr}");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    // Serve until interrupted; in-flight segment relays finish draining.
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
