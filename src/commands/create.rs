use anyhow::Context;
use anyhow::Result;
use log::info;
use tokio_util::sync::CancellationToken;

use crate::App;
use crate::app::until_cancelled;
use crate::binding::SourceControlConfig;
use crate::binding::SourceControlState;
use crate::clients::web_apps::WebAppsOps;

impl<W: WebAppsOps> App<W> {
    /// Bind a web app to a repository and branch.
    ///
    /// 1. Submit the source control configuration.
    /// 2. Wait for the service to finish applying it.
    /// 3. Read it back to learn the ID the service assigned.
    ///
    /// Nothing is returned unless all three steps succeed.
    pub async fn create(
        &self,
        config: &SourceControlConfig,
        cancel: &CancellationToken,
    ) -> Result<SourceControlState> {
        config.validate()?;

        info!(
            "Creating source control for web app {:?} (resource group {:?}): {} ({})",
            config.app_service_name, config.resource_group_name, config.repo_url, config.branch
        );

        let resource_group = &config.resource_group_name;
        let name = &config.app_service_name;
        let source_control = config.to_site_source_control();

        let operation = until_cancelled(
            cancel,
            self.web
                .create_or_update_source_control(resource_group, name, &source_control),
        )
        .await?;

        until_cancelled(cancel, self.web.wait_for_completion(&operation)).await?;

        let read = until_cancelled(cancel, self.web.get_source_control(resource_group, name)).await?;
        let id = read.id.with_context(|| {
            format!(
                "Cannot read source control ID of web app {:?} (resource group {:?})",
                name, resource_group
            )
        })?;

        Ok(SourceControlState::created(id, config))
    }
}
