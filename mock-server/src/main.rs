use tokio::net::TcpListener;

/// Serves the fixture API used by the client's integration tests.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = TcpListener::bind(("127.0.0.1", port.parse::<u16>().unwrap_or(3000))).await?;
    println!("mock server listening on {}", listener.local_addr()?);
    mock_server::run(listener).await
}
