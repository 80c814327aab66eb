use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::clients::web_apps::SiteSourceControl;
use crate::clients::web_apps::SiteSourceControlProperties;
use crate::resource_id::ResourceIdError;
use crate::resource_id::SiteRef;
use crate::validate;

/// Branch deployed when the configuration doesn't name one.
pub const DEFAULT_BRANCH: &str = "master";

/// Declared configuration of a source control binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceControlConfig {
    pub resource_group_name: String,
    pub app_service_name: String,
    pub repo_url: String,
    pub branch: String,
}

impl SourceControlConfig {
    pub fn new(
        resource_group_name: impl Into<String>,
        app_service_name: impl Into<String>,
        repo_url: impl Into<String>,
        branch: Option<String>,
    ) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            app_service_name: app_service_name.into(),
            repo_url: repo_url.into(),
            branch: branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate::resource_group_name("resource_group_name", &self.resource_group_name)?;
        validate::app_service_name("app_service_name", &self.app_service_name)?;
        validate::not_empty("repo_url", &self.repo_url)?;
        Ok(())
    }

    /// The request body sent to the service.
    pub fn to_site_source_control(&self) -> SiteSourceControl {
        SiteSourceControl {
            properties: Some(SiteSourceControlProperties {
                repo_url: Some(self.repo_url.clone()),
                branch: Some(self.branch.clone()),
            }),
            ..Default::default()
        }
    }

    /// Value of a schema field by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "resource_group_name" => Some(self.resource_group_name.as_str()),
            "app_service_name" => Some(self.app_service_name.as_str()),
            "repo_url" => Some(self.repo_url.as_str()),
            "branch" => Some(self.branch.as_str()),
            _ => None,
        }
    }
}

/// Persisted state of a bound source control configuration.
///
/// `repo_url` and `branch` are unknown for an imported binding until the
/// first read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceControlState {
    pub id: String,
    pub resource_group_name: String,
    pub app_service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl SourceControlState {
    /// State for a freshly created binding.
    pub fn created(id: String, config: &SourceControlConfig) -> Self {
        Self {
            id,
            resource_group_name: config.resource_group_name.clone(),
            app_service_name: config.app_service_name.clone(),
            repo_url: Some(config.repo_url.clone()),
            branch: Some(config.branch.clone()),
        }
    }

    /// State holding only what can be recovered from an ID.
    pub fn from_id(id: &str) -> Result<Self, ResourceIdError> {
        let site = SiteRef::from_id(id)?;
        Ok(Self {
            id: id.to_string(),
            resource_group_name: site.resource_group,
            app_service_name: site.site,
            repo_url: None,
            branch: None,
        })
    }

    /// Reconcile with values read from the service.
    ///
    /// The ID decides the resource group and app; repository and branch are
    /// only overwritten when the response carries them.
    pub fn merge_remote(&mut self, site: SiteRef, remote: &SiteSourceControl) {
        self.resource_group_name = site.resource_group;
        self.app_service_name = site.site;
        if let Some(repo_url) = remote.repo_url() {
            self.repo_url = Some(repo_url.to_string());
        }
        if let Some(branch) = remote.branch() {
            self.branch = Some(branch.to_string());
        }
    }

    /// Value of a schema field by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "resource_group_name" => Some(self.resource_group_name.as_str()),
            "app_service_name" => Some(self.app_service_name.as_str()),
            "repo_url" => self.repo_url.as_deref(),
            "branch" => self.branch.as_deref(),
            _ => None,
        }
    }
}
