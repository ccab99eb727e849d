use chrono::Utc;
use funnel_dashboard::{api::ApiClient, router, AppState, Config, Dashboard};
use std::{net::SocketAddr, time::Duration};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const HEALTH_PROBE_DELAY: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    info!(api_url = %config.api_url, "starting dashboard");

    let api = ApiClient::new(config.api_url.clone(), config.http_timeout)?;
    let dashboard = Dashboard::new(api, &config);

    let today = Utc::now().with_timezone(&config.timezone).date_naive();
    dashboard.initialize(today).await;

    let probe = dashboard.clone();
    tokio::spawn(async move {
        tokio::time::sleep(HEALTH_PROBE_DELAY).await;
        probe.check_health().await;
    });

    let mut auto_refresh = dashboard.auto_refresh(config.refresh_interval);

    let app = router(AppState::new(dashboard));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    auto_refresh.stop();
    info!("dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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
