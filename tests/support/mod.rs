//! Helpers for tests that talk to a loopback HTTP server.

use wiremock::MockServer;

/// Whether a loopback socket can be bound here.
///
/// Sandboxed runners may forbid it; those tests are then skipped unless
/// `DIRGRAB_REQUIRE_SOCKET_TESTS` is set, in which case they fail instead.
pub fn loopback_available() -> bool {
    if std::net::TcpListener::bind("127.0.0.1:0").is_ok() {
        return true;
    }
    assert!(
        std::env::var_os("DIRGRAB_REQUIRE_SOCKET_TESTS").is_none(),
        "cannot bind 127.0.0.1 but DIRGRAB_REQUIRE_SOCKET_TESTS is set"
    );
    eprintln!("skipping: cannot bind 127.0.0.1 in this environment");
    false
}

/// Starts a wiremock server, or `None` when loopback is unavailable.
pub async fn mock_server() -> Option<MockServer> {
    if loopback_available() {
        Some(MockServer::start().await)
    } else {
        None
    }
}
