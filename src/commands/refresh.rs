use anyhow::Result;
use futures_util::future::join_all;
use log::warn;
use tokio_util::sync::CancellationToken;

use crate::App;
use crate::clients::web_apps::WebAppsOps;
use crate::error::is_not_found;
use crate::state::StateFile;

impl<W: WebAppsOps> App<W> {
    /// Read every binding in state from the service.
    ///
    /// Bindings the service no longer knows are dropped from state. Any other
    /// failure aborts the refresh and leaves the state file untouched.
    pub async fn cmd_refresh(
        &self,
        cancel: &CancellationToken,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let path = &self.config.state_path;
        let mut state = StateFile::load(path).await?;

        // Each read only touches its own binding
        let reads = state.bindings.iter_mut().map(|(name, binding)| async move {
            let result = self.read(binding, cancel).await;
            (name.clone(), result)
        });
        let results = join_all(reads).await;

        let mut vanished = Vec::new();
        for (name, result) in results {
            match result {
                Ok(()) => writeln!(stdout, "Refreshed {}", name)?,
                Err(err) if is_not_found(&err) => {
                    warn!("{}: {:#}", name, err);
                    writeln!(stdout, "{} no longer exists; removed from state", name)?;
                    vanished.push(name);
                }
                Err(err) => return Err(err.context(format!("Failed to refresh {}", name))),
            }
        }

        for name in vanished {
            state.bindings.remove(&name);
        }
        state.save(path).await
    }
}
