#![allow(async_fn_in_trait)]

use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use log::debug;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;
use tracing::instrument;

use super::arm_curl::ArmCurlClient;
use super::arm_curl::ArmResponse;
use super::arm_curl::CloudError;
use crate::config::Config;
use crate::error::ArmError;
use crate::error::is_not_found;
use crate::resource_id::ResourceId;

/// API version of the Microsoft.Web resource provider.
pub const API_VERSION: &str = "2018-02-01";

// -----------------------------------------------------------------------------
// WebAppsOps trait

/// Source control operations of the App Service management API.
#[cfg_attr(test, automock)]
pub trait WebAppsOps {
    /// Submit the source control configuration of a web app.
    ///
    /// The service completes the change in the background; pass the returned
    /// handle to [`WebAppsOps::wait_for_completion`].
    async fn create_or_update_source_control(
        &self,
        resource_group: &str,
        name: &str,
        source_control: &SiteSourceControl,
    ) -> Result<PendingOperation>;

    /// Wait until a submitted operation reaches a terminal state.
    async fn wait_for_completion(&self, operation: &PendingOperation) -> Result<()>;

    async fn get_source_control(&self, resource_group: &str, name: &str)
    -> Result<SiteSourceControl>;

    async fn delete_source_control(&self, resource_group: &str, name: &str) -> Result<()>;
}

// -----------------------------------------------------------------------------
// Types

/// Source control configuration of a web app, as sent and returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSourceControl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SiteSourceControlProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSourceControlProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl SiteSourceControl {
    pub fn repo_url(&self) -> Option<&str> {
        self.properties.as_ref()?.repo_url.as_deref()
    }

    pub fn branch(&self) -> Option<&str> {
        self.properties.as_ref()?.branch.as_deref()
    }
}

/// Handle to a long-running operation accepted by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOperation {
    /// The service finished the request synchronously.
    Done,
    /// Poll a status document until it reports a terminal status.
    AsyncOperation {
        url: String,
        retry_after: Option<Duration>,
    },
    /// Poll a location until it stops answering 202.
    Location {
        url: String,
        retry_after: Option<Duration>,
    },
}

impl PendingOperation {
    fn from_response(response: &ArmResponse) -> Self {
        let retry_after = response.retry_after();
        if let Some(url) = response.header("azure-asyncoperation") {
            return Self::AsyncOperation {
                url: url.to_string(),
                retry_after,
            };
        }
        if response.status == 202
            && let Some(url) = response.header("location")
        {
            return Self::Location {
                url: url.to_string(),
                retry_after,
            };
        }
        Self::Done
    }
}

#[derive(Debug, Deserialize)]
struct AsyncOperationStatus {
    status: String,
    #[serde(default)]
    error: Option<CloudError>,
}

// -----------------------------------------------------------------------------
// WebAppsClient

/// Client for the `Microsoft.Web/sites` source control endpoints.
pub struct WebAppsClient {
    subscription_id: String,
    endpoint: String,
    poll_interval: Duration,
    http_client: ArmCurlClient,
}

impl WebAppsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            subscription_id: config.subscription_id.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            poll_interval: config.poll_interval,
            http_client: ArmCurlClient::new(config.access_token.clone()),
        }
    }

    fn source_control_url(&self, resource_group: &str, name: &str) -> String {
        let id = ResourceId::web_app_source_control(&self.subscription_id, resource_group, name);
        format!("{}{}?api-version={}", self.endpoint, id, API_VERSION)
    }
}

impl WebAppsOps for WebAppsClient {
    #[instrument(skip_all, fields(resource_group = %resource_group, name = %name))]
    async fn create_or_update_source_control(
        &self,
        resource_group: &str,
        name: &str,
        source_control: &SiteSourceControl,
    ) -> Result<PendingOperation> {
        let url = self.source_control_url(resource_group, name);
        let json_data = serde_json::to_string(source_control)?;
        let response = self.http_client.put(&url, &json_data).await?;
        Ok(PendingOperation::from_response(&response))
    }

    #[instrument(skip_all)]
    async fn wait_for_completion(&self, operation: &PendingOperation) -> Result<()> {
        let (url, retry_after) = match operation {
            PendingOperation::Done => return Ok(()),
            PendingOperation::AsyncOperation { url, retry_after }
            | PendingOperation::Location { url, retry_after } => (url, *retry_after),
        };

        let mut delay = retry_after.unwrap_or(self.poll_interval);
        loop {
            tokio::time::sleep(delay).await;
            let response = self.http_client.get(url).await?;
            delay = response.retry_after().unwrap_or(self.poll_interval);

            if let PendingOperation::Location { .. } = operation {
                if location_finished(&response) {
                    return Ok(());
                }
            } else {
                let status: AsyncOperationStatus = serde_json::from_str(&response.body)
                    .context("Failed to parse long-running operation status")?;
                if let Some(outcome) = operation_outcome(status) {
                    return outcome;
                }
            }
            debug!("Operation still in progress at {}", url);
        }
    }

    #[instrument(skip_all, fields(resource_group = %resource_group, name = %name))]
    async fn get_source_control(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<SiteSourceControl> {
        let url = self.source_control_url(resource_group, name);
        let response = self.http_client.get(&url).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    #[instrument(skip_all, fields(resource_group = %resource_group, name = %name))]
    async fn delete_source_control(&self, resource_group: &str, name: &str) -> Result<()> {
        let url = self.source_control_url(resource_group, name);
        deleted(self.http_client.delete(&url).await)
    }
}

/// Terminal outcome of an `Azure-AsyncOperation` status document, or `None`
/// while the operation is still running.
fn operation_outcome(status: AsyncOperationStatus) -> Option<Result<()>> {
    match status.status.to_ascii_lowercase().as_str() {
        "succeeded" => Some(Ok(())),
        "failed" | "canceled" | "cancelled" => Some(Err(ArmError::OperationFailed {
            message: status.error.map(|e| e.message).unwrap_or_default(),
            status: status.status,
        }
        .into())),
        _ => None,
    }
}

/// A `Location` poll answers 202 until the operation is done.
fn location_finished(response: &ArmResponse) -> bool {
    response.status != 202
}

/// The service answers 404 when nothing is configured; that is a successful
/// delete.
fn deleted(result: Result<ArmResponse>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(err) if is_not_found(&err) => {
            debug!("Source control was already absent: {:#}", err);
            Ok(())
        }
        Err(err) => Err(err),
    }
}
