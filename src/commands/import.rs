use anyhow::Result;
use anyhow::bail;
use tokio_util::sync::CancellationToken;

use crate::App;
use crate::binding::SourceControlState;
use crate::clients::web_apps::WebAppsOps;
use crate::state::StateFile;

impl<W: WebAppsOps> App<W> {
    /// Adopt an existing binding given only its ID.
    pub async fn import(&self, id: &str, cancel: &CancellationToken) -> Result<SourceControlState> {
        let mut state = SourceControlState::from_id(id)?;
        self.read(&mut state, cancel).await?;
        Ok(state)
    }

    /// Import an existing binding into state under `name`.
    pub async fn cmd_import(
        &self,
        name: &str,
        id: &str,
        cancel: &CancellationToken,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let path = &self.config.state_path;
        let mut state = StateFile::load(path).await?;

        if state.bindings.contains_key(name) {
            bail!("A binding named {} already exists in {}", name, path.display());
        }

        let binding = self.import(id, cancel).await?;
        if let Some(other) =
            state.find_by_site(&binding.resource_group_name, &binding.app_service_name)
        {
            bail!(
                "Web app {} in resource group {} is already managed as {}",
                binding.app_service_name,
                binding.resource_group_name,
                other
            );
        }

        writeln!(
            stdout,
            "Imported {}: {} ({})",
            name,
            binding.repo_url.as_deref().unwrap_or("<unknown repository>"),
            binding.branch.as_deref().unwrap_or("<unknown branch>")
        )?;
        state.bindings.insert(name.to_string(), binding);
        state.save(path).await
    }
}
