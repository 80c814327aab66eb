use anyhow::Result;
use anyhow::bail;
use tokio_util::sync::CancellationToken;

use crate::App;
use crate::clients::web_apps::WebAppsOps;
use crate::state::StateFile;

impl<W: WebAppsOps> App<W> {
    pub async fn cmd_destroy(
        &self,
        name: &str,
        cancel: &CancellationToken,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let path = &self.config.state_path;
        let mut state = StateFile::load(path).await?;

        let Some(binding) = state.bindings.get(name) else {
            bail!("No binding named {} in {}", name, path.display());
        };

        self.delete(&binding.id, cancel).await?;
        state.bindings.remove(name);
        state.save(path).await?;

        writeln!(stdout, "Destroyed {}", name)?;
        Ok(())
    }
}
