use std::cell::RefCell;
use std::collections::BTreeMap;

use appsrc::clients::web_apps::PendingOperation;
use appsrc::clients::web_apps::SiteSourceControl;
use appsrc::clients::web_apps::SiteSourceControlProperties;
use appsrc::clients::web_apps::WebAppsOps;
use appsrc::error::ArmError;
use appsrc::resource_id::ResourceId;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer as _;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

pub const SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000000";

/// In-memory stand-in for the App Service management API.
///
/// Source control configurations are keyed by (resource group, site). Every
/// call is recorded so tests can assert on what reached the service.
pub struct FakeWebApps {
    pub sites: RefCell<BTreeMap<(String, String), SiteSourceControlProperties>>,
    pub calls: RefCell<Vec<String>>,
    /// Never finish waiting for submitted operations.
    pub hang_on_wait: bool,
}

impl FakeWebApps {
    pub fn new() -> Self {
        Self {
            sites: RefCell::new(BTreeMap::new()),
            calls: RefCell::new(Vec::new()),
            hang_on_wait: false,
        }
    }

    pub fn hanging_on_wait(mut self) -> Self {
        self.hang_on_wait = true;
        self
    }

    pub fn with_site(self, resource_group: &str, site: &str, repo_url: &str, branch: &str) -> Self {
        self.add_site(resource_group, site, repo_url, branch);
        self
    }

    /// Configure source control out-of-band, as if done in the portal.
    pub fn add_site(&self, resource_group: &str, site: &str, repo_url: &str, branch: &str) {
        self.sites.borrow_mut().insert(
            (resource_group.to_string(), site.to_string()),
            SiteSourceControlProperties {
                repo_url: Some(repo_url.to_string()),
                branch: Some(branch.to_string()),
            },
        );
    }

    pub fn site(&self, resource_group: &str, site: &str) -> Option<SiteSourceControlProperties> {
        self.sites
            .borrow()
            .get(&(resource_group.to_string(), site.to_string()))
            .cloned()
    }

    pub fn remove_site(&self, resource_group: &str, site: &str) {
        self.sites
            .borrow_mut()
            .remove(&(resource_group.to_string(), site.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl WebAppsOps for FakeWebApps {
    async fn create_or_update_source_control(
        &self,
        resource_group: &str,
        name: &str,
        source_control: &SiteSourceControl,
    ) -> anyhow::Result<PendingOperation> {
        self.calls
            .borrow_mut()
            .push(format!("create {resource_group}/{name}"));
        self.sites.borrow_mut().insert(
            (resource_group.to_string(), name.to_string()),
            source_control.properties.clone().unwrap_or_default(),
        );
        Ok(PendingOperation::AsyncOperation {
            url: format!("https://management.azure.com/operations/{resource_group}/{name}"),
            retry_after: None,
        })
    }

    async fn wait_for_completion(&self, _operation: &PendingOperation) -> anyhow::Result<()> {
        self.calls.borrow_mut().push("wait".to_string());
        if self.hang_on_wait {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn get_source_control(
        &self,
        resource_group: &str,
        name: &str,
    ) -> anyhow::Result<SiteSourceControl> {
        self.calls
            .borrow_mut()
            .push(format!("get {resource_group}/{name}"));
        let Some(properties) = self.site(resource_group, name) else {
            return Err(ArmError::NotFound {
                message: format!("Source control for site {name} was not found"),
            }
            .into());
        };
        Ok(SiteSourceControl {
            id: Some(
                ResourceId::web_app_source_control(SUBSCRIPTION_ID, resource_group, name)
                    .to_string(),
            ),
            name: Some(name.to_string()),
            kind: Some("Microsoft.Web/sites/sourcecontrols".to_string()),
            properties: Some(properties),
        })
    }

    async fn delete_source_control(&self, resource_group: &str, name: &str) -> anyhow::Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("delete {resource_group}/{name}"));
        self.remove_site(resource_group, name);
        Ok(())
    }
}

pub fn source_control_id(resource_group: &str, site: &str) -> String {
    ResourceId::web_app_source_control(SUBSCRIPTION_ID, resource_group, site).to_string()
}

pub fn setup_logging() -> anyhow::Result<()> {
    let timer = tracing_subscriber::fmt::time::ChronoLocal::new("%H:%M:%S%.3f".into());
    let format = tracing_subscriber::fmt::format().with_timer(timer);
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    let subscriber = tracing_subscriber::fmt::layer()
        .event_format(format)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_test_writer()
        .with_filter(filter);
    tracing_subscriber::registry().with(subscriber).try_init()?;
    Ok(())
}

pub enum TestDir {
    Temp(tempfile::TempDir),
    Kept(std::path::PathBuf),
}

impl TestDir {
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;

        if std::env::var("DEBUG_TESTS").is_ok() {
            let path = temp_dir.keep();
            eprintln!("Test directory kept at: {}", path.display());
            Ok(TestDir::Kept(path))
        } else {
            Ok(TestDir::Temp(temp_dir))
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            TestDir::Temp(t) => t.path(),
            TestDir::Kept(p) => p.as_path(),
        }
    }
}
