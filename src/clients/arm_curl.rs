use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use serde::Deserialize;
use tokio::process::Command;

use crate::error::ArmError;

/// HTTP client using curl for making Azure Resource Manager requests
pub struct ArmCurlClient {
    token: String,
}

/// A response from the management API.
#[derive(Debug, Clone)]
pub struct ArmResponse {
    pub status: u16,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct CloudErrorBody {
    error: CloudError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CloudError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ArmResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Delay requested by the server before polling again.
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}

impl ArmCurlClient {
    pub fn new(token: String) -> Self {
        Self { token }
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<ArmResponse> {
        self.send("GET", url, None).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put(&self, url: &str, json_data: &str) -> Result<ArmResponse> {
        self.send("PUT", url, Some(json_data)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> Result<ArmResponse> {
        self.send("DELETE", url, None).await
    }

    async fn send(&self, method: &str, url: &str, json_data: Option<&str>) -> Result<ArmResponse> {
        let authorization = format!("Authorization: Bearer {}", self.token);
        let mut args = vec![
            "-s",
            "-S",
            "-D",
            "-",
            "-w",
            "\n%{http_code}",
            "-X",
            method,
            "-H",
            authorization.as_str(),
            "-H",
            "Accept: application/json",
            "-H",
            "User-Agent: appsrc",
        ];
        if let Some(json_data) = json_data {
            args.extend(["-H", "Content-Type: application/json", "-d", json_data]);
        }
        args.push(url);

        let output = Command::new("curl")
            .args(&args)
            .output()
            .await
            .context("Failed to execute curl command")?;

        if !output.status.success() {
            bail!(
                "curl command failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let response = parse_output(&String::from_utf8(output.stdout)?)?;
        check_status(response)
    }
}

/// Split curl output (`-D -` headers, body, then the `-w` status code) into
/// a response.
fn parse_output(output: &str) -> Result<ArmResponse> {
    let (raw, status) = output
        .rsplit_once('\n')
        .context("curl output is missing the status code")?;
    let status = status
        .trim()
        .parse::<u16>()
        .with_context(|| format!("Invalid HTTP status code from curl: {status:?}"))?;

    // Interim responses (100 Continue) and redirects each print a header block
    let mut rest = raw;
    let mut headers = HashMap::new();
    while rest.starts_with("HTTP/") {
        let (block, body) = rest.split_once("\r\n\r\n").unwrap_or((rest, ""));
        headers = block
            .lines()
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect();
        rest = body;
    }

    Ok(ArmResponse {
        status,
        headers,
        body: rest.to_string(),
    })
}

fn check_status(response: ArmResponse) -> Result<ArmResponse> {
    if response.status == 0 {
        bail!("No HTTP response received");
    }
    if response.status < 400 {
        return Ok(response);
    }

    let (code, message) = match serde_json::from_str::<CloudErrorBody>(&response.body) {
        Ok(body) => (body.error.code, body.error.message),
        Err(_) => (String::new(), response.body.trim().to_string()),
    };

    if response.status == 404 {
        return Err(ArmError::NotFound { message }.into());
    }
    Err(ArmError::Api {
        status: response.status,
        code,
        message,
    }
    .into())
}
