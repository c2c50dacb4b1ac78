use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fleet_backoffice::config::EnvironmentConfig;
use fleet_backoffice::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging (RUST_LOG, por defecto info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚛 Fleet Back Office");
    info!("===================");

    let config = EnvironmentConfig::from_env()?;
    info!(
        "⚙️ Ambiente: {} | storage: {} | offset de negocio: {}h",
        config.environment,
        config.storage.as_str(),
        config.business_utc_offset_hours
    );

    let addr: SocketAddr = config.server_url().parse()?;
    let state = match AppState::from_config(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Error inicializando el estado: {:#}", e);
            return Err(e);
        }
    };
    info!("🗄️ Cache de vistas: {}", state.cache.backend_name());

    let app = create_router(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   CRUD /api/companies, /api/units, /api/clients, /api/drivers");
    info!("   CRUD /api/trucks, /api/semi-trailers, /api/groupings, /api/trips");
    info!("   GET  /api/cargos, /api/dashboard");
    info!("   POST /api/units/import, /api/trip-wizard");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
