//! Shared utilities for end-to-end tests.

use std::net::SocketAddr;
use std::time::Duration;

use jwa::{HttpServer, RegistryBuilder, ServerConfig, Shutdown};
use tokio::net::TcpListener;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Compile `registry` and serve it on `127.0.0.1:0`.
pub async fn start_server(registry: &mut RegistryBuilder) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(registry.compile(), ServerConfig::default());
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown }
}

/// Client without connection pooling or proxies, so each test sees a fresh connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
