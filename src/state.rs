use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use serde::Deserialize;
use serde::Serialize;

use crate::binding::SourceControlState;

pub const STATE_VERSION: u32 = 1;

/// Bindings under management, keyed by the name given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    #[serde(default)]
    pub bindings: BTreeMap<String, SourceControlState>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            bindings: BTreeMap::new(),
        }
    }
}

impl StateFile {
    /// Load state, treating a missing file as empty state.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read state file {}", path.display()))?;
        let state: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse state file {}", path.display()))?;

        if state.version != STATE_VERSION {
            bail!(
                "Unsupported state file version {} in {} (expected {})",
                state.version,
                path.display(),
                STATE_VERSION
            );
        }

        Ok(state)
    }

    /// Name of the binding that manages a web app, if any.
    pub fn find_by_site(&self, resource_group: &str, app_service: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, binding)| {
                binding.resource_group_name == resource_group
                    && binding.app_service_name == app_service
            })
            .map(|(name, _)| name.as_str())
    }

    /// Save state through a temporary file so a crash never leaves it truncated.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let mut tmp_path = path.as_os_str().to_owned();
        tmp_path.push(".tmp");

        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&tmp_path, contents)
            .await
            .with_context(|| format!("Failed to write state file {}", path.display()))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .with_context(|| format!("Failed to replace state file {}", path.display()))?;
        Ok(())
    }
}
