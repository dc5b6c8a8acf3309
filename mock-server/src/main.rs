use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt::init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let defaults = mock_server::Credentials::default();
    let credentials = mock_server::Credentials::new(
        std::env::var("MOCK_USERNAME").unwrap_or(defaults.username),
        std::env::var("MOCK_PASSWORD").unwrap_or(defaults.password),
    );
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(username = %credentials.username, "listening on {addr}");
    mock_server::run_with(listener, credentials).await
}
