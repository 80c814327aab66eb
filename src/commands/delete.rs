use anyhow::Result;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::App;
use crate::app::until_cancelled;
use crate::clients::web_apps::WebAppsOps;
use crate::resource_id::SiteRef;

impl<W: WebAppsOps> App<W> {
    /// Remove the source control configuration identified by `id`.
    ///
    /// Success means the delete request succeeded; the binding's absence is
    /// not re-checked afterwards.
    pub async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<()> {
        let site = SiteRef::from_id(id)?;

        debug!(
            "Deleting source control on web app {:?} (resource group {:?})",
            site.site, site.resource_group
        );

        until_cancelled(
            cancel,
            self.web
                .delete_source_control(&site.resource_group, &site.site),
        )
        .await
    }
}
