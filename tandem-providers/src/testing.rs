//! Test fixtures shared by the generator tests.

use std::sync::Arc;
use std::time::Duration;

use tandem_core::{BackendKind, Credentials};
use tandem_fetch::HttpClient;
use tandem_store::CredentialStore;
use tempfile::TempDir;
use tokio::net::TcpStream;
use wiremock::MockServer;

use crate::backend::BackendTransport;
use crate::oauth::{OAuth2Client, OAuthConfig};

/// A mock backend plus an OAuth client holding a valid cached token.
pub(crate) struct Backend {
    _dir: TempDir,
    pub server: MockServer,
    pub auth: Arc<OAuth2Client>,
}

impl Backend {
    pub async fn start(kind: BackendKind) -> Self {
        let dir = TempDir::new().unwrap();
        let server = MockServer::start().await;
        let uri = server.uri();

        let store = CredentialStore::new(dir.path().join(kind.cli_name()));
        store
            .save_credentials(&Credentials::new("test-token"))
            .await
            .unwrap();

        let config = OAuthConfig::new(
            "client-id",
            format!("{uri}/auth"),
            format!("{uri}/token"),
            format!("{uri}/userinfo"),
        );
        let auth = Arc::new(OAuth2Client::new(
            kind,
            config,
            store,
            HttpClient::new().unwrap(),
        ));

        Self {
            _dir: dir,
            server,
            auth,
        }
    }

    /// Starts a backend whose credential cache is empty.
    pub async fn unauthenticated(kind: BackendKind) -> Self {
        let backend = Self::start(kind).await;
        backend.auth.store().clear().await.unwrap();
        backend
    }

    pub fn transport(&self) -> BackendTransport {
        BackendTransport::new(self.auth.clone(), HttpClient::new().unwrap(), self.server.uri())
    }
}

/// Polls a loopback port until connections are refused.
///
/// Returns `false` if the port still accepts connections after one second.
pub(crate) async fn port_closes(port: u16) -> bool {
    for _ in 0..100 {
        if TcpStream::connect(("127.0.0.1", port)).await.is_err() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
