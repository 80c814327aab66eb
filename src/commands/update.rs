use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::App;
use crate::binding::SourceControlConfig;
use crate::binding::SourceControlState;
use crate::clients::web_apps::WebAppsOps;

impl<W: WebAppsOps> App<W> {
    /// Change the repository or branch of a binding.
    ///
    /// The service offers no in-place update here, so this deletes the
    /// current binding and creates a new one from `config`. The two steps are
    /// not atomic: if the create fails after the delete succeeded, the web app
    /// is left without source control while `current` still describes the old
    /// binding. A later [`App::read`] reports that as not found.
    pub async fn update(
        &self,
        current: &SourceControlState,
        config: &SourceControlConfig,
        cancel: &CancellationToken,
    ) -> Result<SourceControlState> {
        self.delete(&current.id, cancel).await?;
        self.create(config, cancel).await
    }
}
