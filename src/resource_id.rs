use std::collections::BTreeMap;
use std::fmt::Display;

/// Resource provider namespace for App Service.
pub const WEB_PROVIDER: &str = "Microsoft.Web";

/// Errors produced while parsing an Azure resource ID.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResourceIdError {
    #[error("cannot parse Azure ID {0:?}: empty ID")]
    Empty(String),
    #[error("the number of path segments is not divisible by 2 in {0:?}")]
    OddSegments(String),
    #[error("key/value cannot be empty strings in {0:?}")]
    EmptySegment(String),
    #[error("no subscription ID found in {0:?}")]
    MissingSubscription(String),
    #[error("no resource group found in {0:?}")]
    MissingResourceGroup(String),
    #[error("no {key:?} segment found in {id:?}")]
    MissingSegment { key: String, id: String },
}

/// A parsed Azure resource ID.
///
/// IDs are a sequence of `key/value` path segments, e.g.
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Web/sites/{app}`.
/// The subscription, resource group and provider segments get dedicated
/// fields; everything else is reachable through [`ResourceId::segment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: Option<String>,
    pub provider: Option<String>,
    path: BTreeMap<String, String>,
    /// Path keys in the order they appeared, used when formatting.
    order: Vec<String>,
}

impl ResourceId {
    pub fn parse(id: &str) -> Result<Self, ResourceIdError> {
        let trimmed = id.trim_matches('/');
        if trimmed.is_empty() {
            return Err(ResourceIdError::Empty(id.to_string()));
        }

        let components: Vec<&str> = trimmed.split('/').collect();
        if components.len() % 2 != 0 {
            return Err(ResourceIdError::OddSegments(id.to_string()));
        }

        let mut subscription_id = None;
        let mut resource_group = None;
        let mut provider = None;
        let mut path = BTreeMap::new();
        let mut order = Vec::new();

        for pair in components.chunks(2) {
            let (key, value) = (pair[0], pair[1]);
            if key.is_empty() || value.is_empty() {
                return Err(ResourceIdError::EmptySegment(id.to_string()));
            }
            match key {
                "subscriptions" => subscription_id = Some(value.to_string()),
                // The API is inconsistent about the casing of this segment
                "resourceGroups" | "resourcegroups" => resource_group = Some(value.to_string()),
                "providers" => provider = Some(value.to_string()),
                _ => {
                    if path.insert(key.to_string(), value.to_string()).is_none() {
                        order.push(key.to_string());
                    }
                }
            }
        }

        let subscription_id =
            subscription_id.ok_or_else(|| ResourceIdError::MissingSubscription(id.to_string()))?;

        Ok(Self {
            subscription_id,
            resource_group,
            provider,
            path,
            order,
        })
    }

    /// ID of the source control configuration of a web app.
    pub fn web_app_source_control(subscription_id: &str, resource_group: &str, site: &str) -> Self {
        let path = BTreeMap::from([
            ("sites".to_string(), site.to_string()),
            ("sourcecontrols".to_string(), "web".to_string()),
        ]);
        Self {
            subscription_id: subscription_id.to_string(),
            resource_group: Some(resource_group.to_string()),
            provider: Some(WEB_PROVIDER.to_string()),
            path,
            order: vec!["sites".to_string(), "sourcecontrols".to_string()],
        }
    }

    /// Look up a path segment by its key, e.g. `sites`.
    pub fn segment(&self, key: &str) -> Option<&str> {
        self.path.get(key).map(String::as_str)
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/subscriptions/{}", self.subscription_id)?;
        if let Some(resource_group) = &self.resource_group {
            write!(f, "/resourceGroups/{resource_group}")?;
        }
        if let Some(provider) = &self.provider {
            write!(f, "/providers/{provider}")?;
        }
        for key in &self.order {
            if let Some(value) = self.path.get(key) {
                write!(f, "/{key}/{value}")?;
            }
        }
        Ok(())
    }
}

/// The (resource group, app name) pair addressed by a persisted binding ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRef {
    pub resource_group: String,
    pub site: String,
}

impl SiteRef {
    /// Recover the resource group and app name from a source control ID.
    pub fn from_id(id: &str) -> Result<Self, ResourceIdError> {
        let parsed = ResourceId::parse(id)?;
        let resource_group = parsed
            .resource_group
            .clone()
            .ok_or_else(|| ResourceIdError::MissingResourceGroup(id.to_string()))?;
        let site = parsed
            .segment("sites")
            .ok_or_else(|| ResourceIdError::MissingSegment {
                key: "sites".to_string(),
                id: id.to_string(),
            })?
            .to_string();
        Ok(Self {
            resource_group,
            site,
        })
    }
}
