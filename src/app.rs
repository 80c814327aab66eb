use std::future::Future;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::clients::web_apps::WebAppsOps;
use crate::config::Config;
use crate::error::ArmError;

pub struct App<W: WebAppsOps> {
    pub config: Config,
    pub web: W,
}

impl<W: WebAppsOps> App<W> {
    pub fn new(config: Config, web: W) -> Self {
        Self { config, web }
    }
}

/// Run a remote call unless the operation context is cancelled first.
///
/// The call is never started once the token is cancelled. Dropping an
/// in-flight call stops waiting for it but does not undo work the service has
/// already accepted.
pub(crate) async fn until_cancelled<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ArmError::Cancelled.into()),
        result = call => result,
    }
}
