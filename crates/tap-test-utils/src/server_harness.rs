//! Test server harness for E2E testing
//!
//! Provides `TestTapServer` for spawning real tap service instances in tests.

use crate::init_data_fixtures::TEST_BOT_TOKEN;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tap_service::config::Config;
use tap_service::observability::metrics::init_metrics_recorder;
use tap_service::routes::{self, AppState};
use tap_service::services::telegram_client::mock::MockMembershipChecker;
use tap_service::services::ChatMembershipChecker;
use tokio::task::JoinHandle;

/// Global metrics handle shared by every test server in the process.
static TEST_METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn test_metrics_handle() -> PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            init_metrics_recorder()
                .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle())
        })
        .clone()
}

/// Test harness for spawning the tap service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[sqlx::test(migrations = "../../migrations")]
/// async fn test_health_flow_e2e(pool: SqlitePool) -> Result<()> {
///     let server = TestTapServer::spawn(pool).await?;
///
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestTapServer {
    addr: SocketAddr,
    pool: SqlitePool,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestTapServer {
    /// Spawn a test server whose membership checker reports every user as a
    /// member.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Accept initData signed with [`TEST_BOT_TOKEN`]
    /// - Start the HTTP server in the background
    pub async fn spawn(pool: SqlitePool) -> Result<Self, anyhow::Error> {
        Self::spawn_with(pool, HashMap::new(), Arc::new(MockMembershipChecker::member())).await
    }

    /// Spawn a test server with extra environment variables and a custom
    /// membership checker.
    ///
    /// `overrides` are applied on top of the test defaults, e.g.
    /// `DB_DOWNLOAD_PATH` or `CORS_ALLOWED_ORIGINS`.
    pub async fn spawn_with(
        pool: SqlitePool,
        overrides: HashMap<String, String>,
        membership: Arc<dyn ChatMembershipChecker>,
    ) -> Result<Self, anyhow::Error> {
        let mut vars = HashMap::from([
            ("DATABASE_URL".to_string(), "sqlite::memory:".to_string()),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("TELEGRAM_BOT_TOKEN".to_string(), TEST_BOT_TOKEN.to_string()),
        ]);
        vars.extend(overrides);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(AppState {
            pool: pool.clone(),
            config: config.clone(),
            membership,
        });

        // Build routes using tap-service's real route builder
        let app = routes::build_routes(state, test_metrics_handle());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            pool,
            config,
            _handle: handle,
        })
    }

    /// Get reference to the database pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for TestTapServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
