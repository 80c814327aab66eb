use anyhow::Result;
use anyhow::bail;
use tokio_util::sync::CancellationToken;

use crate::App;
use crate::binding::SourceControlConfig;
use crate::clients::web_apps::WebAppsOps;
use crate::schema;
use crate::schema::Change;
use crate::state::StateFile;

impl<W: WebAppsOps> App<W> {
    /// Converge the binding stored under `name` to `config`.
    ///
    /// A missing binding is created, a changed repository or branch is
    /// updated, and a changed resource group or app replaces the binding.
    /// State is only written after the whole step succeeded.
    pub async fn cmd_apply(
        &self,
        name: &str,
        config: &SourceControlConfig,
        cancel: &CancellationToken,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let path = &self.config.state_path;
        let mut state = StateFile::load(path).await?;

        if let Some(other) =
            state.find_by_site(&config.resource_group_name, &config.app_service_name)
            && other != name
        {
            bail!(
                "Web app {} in resource group {} is already managed as {}",
                config.app_service_name,
                config.resource_group_name,
                other
            );
        }

        let binding = match state.bindings.get(name) {
            None => {
                writeln!(
                    stdout,
                    "Creating {}: {} ({}) on {}/{}",
                    name,
                    config.repo_url,
                    config.branch,
                    config.resource_group_name,
                    config.app_service_name
                )?;
                self.create(config, cancel).await?
            }
            Some(current) => match schema::diff(current, config) {
                Change::NoChange => {
                    writeln!(stdout, "{} is up to date", name)?;
                    return Ok(());
                }
                Change::Update(fields) => {
                    writeln!(stdout, "Updating {} (changed: {})", name, fields.join(", "))?;
                    self.update(current, config, cancel).await?
                }
                Change::Replace(fields) => {
                    writeln!(stdout, "Replacing {} (changed: {})", name, fields.join(", "))?;
                    self.delete(&current.id, cancel).await?;
                    self.create(config, cancel).await?
                }
            },
        };

        writeln!(stdout, "Applied {}: {}", name, binding.id)?;
        state.bindings.insert(name.to_string(), binding);
        state.save(path).await
    }
}
