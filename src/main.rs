use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use appsrc::App;
use appsrc::Config;
use appsrc::binding::DEFAULT_BRANCH;
use appsrc::binding::SourceControlConfig;
use appsrc::clients::web_apps::WebAppsClient;
use clap::Parser;
use clap::Subcommand;
use log::warn;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer as _;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[derive(Parser)]
#[command(name = "appsrc")]
#[command(about = "Manage which repository and branch an Azure web app deploys from", long_about = None)]
pub struct Cli {
    /// State file (defaults to $APPSRC_STATE or appsrc.state.json)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or update a binding to match the given configuration
    Apply {
        /// Name of the binding in the state file
        name: String,
        #[arg(long)]
        resource_group: String,
        #[arg(long)]
        app_service: String,
        #[arg(long)]
        repo_url: String,
        /// Branch to deploy from
        #[arg(long, default_value = DEFAULT_BRANCH)]
        branch: String,
    },
    /// Read every binding in state from Azure
    Refresh,
    /// Adopt an existing binding by its resource ID
    Import {
        /// Name of the binding in the state file
        name: String,
        /// Resource ID of the web app's source control
        id: String,
    },
    /// Remove a binding from Azure and from state
    Destroy {
        /// Name of the binding in the state file
        name: String,
    },
    /// Show bindings recorded in state
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cli = Cli::parse();

    let mut config = Config::load_local()?;
    if let Some(state) = cli.state {
        config.state_path = state;
    }
    let stdout = &mut std::io::stdout();

    // Showing state is purely local and works without Azure credentials
    let command = match cli.command {
        Some(Commands::Show) | None => {
            let app = App::new(config.clone(), WebAppsClient::new(&config));
            return app.cmd_show(stdout).await;
        }
        Some(command) => command,
    };

    config.load_credentials()?;

    let cancel = CancellationToken::new();
    spawn_stop_signal(cancel.clone(), config.operation_timeout);

    let app = App::new(config.clone(), WebAppsClient::new(&config));

    match command {
        Commands::Apply {
            name,
            resource_group,
            app_service,
            repo_url,
            branch,
        } => {
            let source_control =
                SourceControlConfig::new(resource_group, app_service, repo_url, Some(branch));
            app.cmd_apply(&name, &source_control, &cancel, stdout).await?
        }
        Commands::Refresh => app.cmd_refresh(&cancel, stdout).await?,
        Commands::Import { name, id } => app.cmd_import(&name, &id, &cancel, stdout).await?,
        Commands::Destroy { name } => app.cmd_destroy(&name, &cancel, stdout).await?,
        Commands::Show => app.cmd_show(stdout).await?,
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Stop {
    Interrupted,
    TimedOut,
}

/// Cancel the operation context on Ctrl-C or once the timeout elapses.
fn spawn_stop_signal(cancel: CancellationToken, timeout: Duration) {
    tokio::spawn(async move {
        match wait_for_stop(tokio::signal::ctrl_c(), timeout).await {
            Stop::Interrupted => warn!("Interrupted; abandoning the current operation"),
            Stop::TimedOut => warn!("Operation timed out after {:?}", timeout),
        }
        cancel.cancel();
    });
}

/// Resolve on a successful Ctrl-C or after `timeout`. A handler that cannot
/// be installed leaves only the timeout.
async fn wait_for_stop(
    ctrl_c: impl Future<Output = std::io::Result<()>>,
    timeout: Duration,
) -> Stop {
    let ctrl_c = async {
        ctrl_c
            .await
            .inspect_err(|err| warn!("Cannot listen for Ctrl-C: {}", err))
    };
    tokio::select! {
        Ok(()) = ctrl_c => Stop::Interrupted,
        _ = tokio::time::sleep(timeout) => Stop::TimedOut,
    }
}

fn setup_logging() -> Result<()> {
    let timer = tracing_subscriber::fmt::time::ChronoLocal::new("%H:%M:%S%.3f".into());
    let format = tracing_subscriber::fmt::format().with_timer(timer);
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env()?;
    let subscriber = tracing_subscriber::fmt::layer()
        .event_format(format)
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(subscriber).init();
    Ok(())
}
