use mock_server::MockConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");

    let mut config = MockConfig::default();
    if let Ok(client_id) = std::env::var("MOCK_CLIENT_ID") {
        config.client_id = client_id;
    }
    if let Ok(secret) = std::env::var("MOCK_CLIENT_SECRET") {
        config.client_secret = secret;
    }
    if let Ok(redirect_uri) = std::env::var("MOCK_REDIRECT_URI") {
        config.redirect_uri = redirect_uri;
    }

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, client_id = %config.client_id, "mock LinkedIn provider listening");
    mock_server::run(listener, config).await
}
