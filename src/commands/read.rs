use anyhow::Context;
use anyhow::Result;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::App;
use crate::app::until_cancelled;
use crate::binding::SourceControlState;
use crate::clients::web_apps::WebAppsOps;
use crate::resource_id::SiteRef;

impl<W: WebAppsOps> App<W> {
    /// Refresh a binding from the service.
    ///
    /// A not-found response is returned as an error; check it with
    /// [`crate::error::is_not_found`] to tell a vanished binding apart from a
    /// failed request.
    pub async fn read(&self, state: &mut SourceControlState, cancel: &CancellationToken) -> Result<()> {
        let site = SiteRef::from_id(&state.id)?;

        debug!(
            "Reading source control of web app {:?} (resource group {:?})",
            site.site, site.resource_group
        );

        let remote = until_cancelled(
            cancel,
            self.web.get_source_control(&site.resource_group, &site.site),
        )
        .await
        .with_context(|| {
            format!(
                "Error making Read request on source control of web app {:?} in resource group {:?}",
                site.site, site.resource_group
            )
        })?;

        state.merge_remote(site, &remote);
        Ok(())
    }
}
