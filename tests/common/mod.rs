use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const ROLE_HEADER: &str = "x-user-role";
pub const TENANT_HEADER: &str = "x-user-tenant";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Serve the committed fixture tenants
        let assets = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/config");

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tenant-datamodel"));
        cmd.env("API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("ASSETS_PATH", assets)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    // Use stable get_or_init and convert init errors into a panic with context.
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// GET as a user of tenant "acme" with the given role
pub async fn get_as(path: &str, role: &str) -> Result<(StatusCode, serde_json::Value)> {
    let server = ensure_server().await?;
    let res = reqwest::Client::new()
        .get(server.url(path))
        .header(ROLE_HEADER, role)
        .header(TENANT_HEADER, "acme")
        .send()
        .await?;
    let status = res.status();
    Ok((status, res.json().await?))
}

#[allow(dead_code)]
pub async fn post_json(path: &str, body: &serde_json::Value) -> Result<(StatusCode, serde_json::Value)> {
    let server = ensure_server().await?;
    let res = reqwest::Client::new()
        .post(server.url(path))
        .header(ROLE_HEADER, "approver")
        .header(TENANT_HEADER, "acme")
        .json(body)
        .send()
        .await?;
    let status = res.status();
    Ok((status, res.json().await?))
}
