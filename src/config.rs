use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;

pub const SUBSCRIPTION_ID_VAR: &str = "ARM_SUBSCRIPTION_ID";
pub const ACCESS_TOKEN_VAR: &str = "ARM_ACCESS_TOKEN";
pub const ENDPOINT_VAR: &str = "ARM_ENDPOINT";
pub const POLL_INTERVAL_VAR: &str = "APPSRC_POLL_INTERVAL";
pub const TIMEOUT_VAR: &str = "APPSRC_TIMEOUT";
pub const STATE_VAR: &str = "APPSRC_STATE";

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_STATE_PATH: &str = "appsrc.state.json";

#[derive(Clone)]
pub struct Config {
    pub subscription_id: String,
    pub access_token: String,
    /// Base URL of the Resource Manager endpoint.
    pub endpoint: String,
    /// Delay between polls of a long-running operation when the service
    /// doesn't send `Retry-After`.
    pub poll_interval: Duration,
    /// Upper bound on a single lifecycle operation, including polling.
    pub operation_timeout: Duration,
    pub state_path: PathBuf,
}

impl Config {
    /// Load the settings that don't involve Azure.
    ///
    /// The subscription and token are left empty; call
    /// [`Config::load_credentials`] before making remote calls.
    pub fn load_local() -> Result<Self> {
        let endpoint = std::env::var(ENDPOINT_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let poll_interval = Self::duration_from_env(POLL_INTERVAL_VAR, DEFAULT_POLL_INTERVAL)?;
        let operation_timeout = Self::duration_from_env(TIMEOUT_VAR, DEFAULT_TIMEOUT)?;
        let state_path = std::env::var(STATE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH));

        Ok(Self {
            subscription_id: String::new(),
            access_token: String::new(),
            endpoint,
            poll_interval,
            operation_timeout,
            state_path,
        })
    }

    /// Fill in the subscription and token for talking to Azure, falling back
    /// to the Azure CLI for a token.
    pub fn load_credentials(&mut self) -> Result<()> {
        self.subscription_id = std::env::var(SUBSCRIPTION_ID_VAR)
            .with_context(|| format!("{SUBSCRIPTION_ID_VAR} is not set"))?;

        self.access_token = match std::env::var(ACCESS_TOKEN_VAR) {
            Ok(token) => token,
            Err(_) => Self::access_token_from_azure_cli()?,
        };
        Ok(())
    }

    /// Ask the Azure CLI for a management token of the signed-in account
    fn access_token_from_azure_cli() -> Result<String> {
        let output = std::process::Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                "https://management.azure.com/",
                "--query",
                "accessToken",
                "--output",
                "tsv",
            ])
            .output()
            .with_context(|| {
                format!("{ACCESS_TOKEN_VAR} is not set and the Azure CLI could not be run")
            })?;

        if !output.status.success() {
            anyhow::bail!(
                "{ACCESS_TOKEN_VAR} is not set and 'az account get-access-token' failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8(output.stdout)?.trim().to_string())
    }

    fn duration_from_env(var: &str, default: Duration) -> Result<Duration> {
        match std::env::var(var) {
            Ok(value) => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("{var} must be a number of seconds, got {value:?}"))?;
                Ok(Duration::from_secs(secs))
            }
            Err(_) => Ok(default),
        }
    }

    /// Create a new config with explicit values
    pub fn new(subscription_id: String, access_token: String) -> Self {
        Self {
            subscription_id,
            access_token,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            operation_timeout: DEFAULT_TIMEOUT,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }

    /// Default config for tests
    pub fn default_for_tests() -> Self {
        Self {
            subscription_id: "00000000-0000-0000-0000-000000000000".to_string(),
            access_token: "test-token".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: Duration::from_millis(1),
            operation_timeout: Duration::from_secs(5),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("subscription_id", &self.subscription_id)
            .field("access_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("poll_interval", &self.poll_interval)
            .field("operation_timeout", &self.operation_timeout)
            .field("state_path", &self.state_path)
            .finish()
    }
}
