use chess_duel::api::router::create_router;
use chess_duel::api::state::AppState;
use chess_duel::config::AppConfig;
use chess_duel::net::{self, SessionRegistry};

#[tokio::main]
async fn main() {
    // Handle --health-check flag for container HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        match health_check().await {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("Health check failed: {e}");
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_duel=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    let registry = SessionRegistry::new();

    tracing::info!(
        "chess-duel v{} starting, game port {}, layout {}",
        env!("CARGO_PKG_VERSION"),
        config.port,
        config.layout
    );

    if config.status_enabled {
        let status_addr = config.status_addr();
        let app = create_router(AppState::new(config.clone(), registry.clone()));
        match tokio::net::TcpListener::bind(&status_addr).await {
            Ok(listener) => {
                tracing::info!("status endpoint on {status_addr}");
                tokio::spawn(async move {
                    if let Err(e) = axum::serve(listener, app).await {
                        tracing::error!(error = %e, "status server stopped");
                    }
                });
            }
            Err(e) => tracing::warn!(addr = %status_addr, error = %e, "status endpoint disabled"),
        }
    }

    let bind_addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %bind_addr, error = %e, "failed to bind game port");
            std::process::exit(1);
        }
    };

    if let Err(e) = net::serve(listener, config.layout, registry).await {
        tracing::error!(error = %e, "game server error");
        std::process::exit(1);
    }
}

/// Lightweight health check: send raw HTTP/1.1 request and check for 200 OK.
async fn health_check() -> Result<(), Box<dyn std::error::Error>> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let port = AppConfig::from_env().status_port;
    let mut stream = tokio::net::TcpStream::connect(format!("127.0.0.1:{port}")).await?;
    let request =
        format!("GET /health HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;
    let mut buf = vec![0u8; 1024];
    let n = stream.read(&mut buf).await?;
    let response = String::from_utf8_lossy(&buf[..n]);
    if response.starts_with("HTTP/1.1 200") {
        Ok(())
    } else {
        Err(format!(
            "Unexpected response: {}",
            response.lines().next().unwrap_or("")
        )
        .into())
    }
}
