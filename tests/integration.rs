//! cargo test --test integration -- --nocapture

mod utils;

use std::sync::LazyLock;

use appsrc::App;
use appsrc::Config;
use appsrc::binding::SourceControlConfig;
use tokio_util::sync::CancellationToken;
use utils::FakeWebApps;

// Normalize IDs etc.
static INSTA_FILTERS: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    vec![
        // Subscription ID
        (r"/subscriptions/[0-9a-f-]{36}", "/subscriptions/[SUB]"),
    ]
});

#[ctor::ctor]
fn init() {
    // Disable colors for all integration tests to get clean output
    colored::control::set_override(false);
    utils::setup_logging().unwrap();
}

fn setup(test_dir: &utils::TestDir) -> App<FakeWebApps> {
    let mut config = Config::default_for_tests();
    config.state_path = test_dir.path().join("appsrc.state.json");
    App::new(config, FakeWebApps::new())
}

fn source_control(app_service: &str, repo_url: &str, branch: &str) -> SourceControlConfig {
    SourceControlConfig::new("acc-rg", app_service, repo_url, Some(branch.to_string()))
}

#[tokio::test]
async fn test_binding_workflow() -> anyhow::Result<()> {
    let test_dir = utils::TestDir::new()?;
    let app = setup(&test_dir);
    let cancel = CancellationToken::new();

    let out = run_and_capture!(|out| app.cmd_show(out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @"No source control bindings in state");

    // -------------------------------------------------------------------------
    // Create

    let config = source_control("acc-app", "https://github.com/acme/a.git", "master");
    let out = run_and_capture!(|out| app.cmd_apply("site", &config, &cancel, out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @r"
        Creating site: https://github.com/acme/a.git (master) on acc-rg/acc-app
        Applied site: /subscriptions/[SUB]/resourceGroups/acc-rg/providers/Microsoft.Web/sites/acc-app/sourcecontrols/web
    ");

    let out = run_and_capture!(|out| app.cmd_apply("site", &config, &cancel, out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @"site is up to date");

    let out = run_and_capture!(|out| app.cmd_show(out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @r"
        site https://github.com/acme/a.git (master)
          /subscriptions/[SUB]/resourceGroups/acc-rg/providers/Microsoft.Web/sites/acc-app/sourcecontrols/web
    ");

    // -------------------------------------------------------------------------
    // Update in place

    let config = source_control("acc-app", "https://github.com/acme/b.git", "dev");
    let out = run_and_capture!(|out| app.cmd_apply("site", &config, &cancel, out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @r"
        Updating site (changed: repo_url, branch)
        Applied site: /subscriptions/[SUB]/resourceGroups/acc-rg/providers/Microsoft.Web/sites/acc-app/sourcecontrols/web
    ");

    let remote = app.web.site("acc-rg", "acc-app").unwrap();
    assert_eq!(remote.repo_url.as_deref(), Some("https://github.com/acme/b.git"));
    assert_eq!(remote.branch.as_deref(), Some("dev"));

    // -------------------------------------------------------------------------
    // Removed out-of-band

    app.web.remove_site("acc-rg", "acc-app");

    let out = run_and_capture!(|out| app.cmd_refresh(&cancel, out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @"site no longer exists; removed from state");

    let out = run_and_capture!(|out| app.cmd_show(out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @"No source control bindings in state");

    Ok(())
}

#[tokio::test]
async fn test_refresh_picks_up_remote_changes() -> anyhow::Result<()> {
    let test_dir = utils::TestDir::new()?;
    let app = setup(&test_dir);
    let cancel = CancellationToken::new();

    let config = source_control("acc-app", "https://github.com/acme/a.git", "master");
    run_and_capture!(|out| app.cmd_apply("site", &config, &cancel, out));

    // Someone switches the branch in the portal
    app.web
        .add_site("acc-rg", "acc-app", "https://github.com/acme/a.git", "hotfix");

    let out = run_and_capture!(|out| app.cmd_refresh(&cancel, out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @"Refreshed site");

    let out = run_and_capture!(|out| app.cmd_show(out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @r"
        site https://github.com/acme/a.git (hotfix)
          /subscriptions/[SUB]/resourceGroups/acc-rg/providers/Microsoft.Web/sites/acc-app/sourcecontrols/web
    ");

    // The next apply puts the configured branch back
    let out = run_and_capture!(|out| app.cmd_apply("site", &config, &cancel, out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @r"
        Updating site (changed: branch)
        Applied site: /subscriptions/[SUB]/resourceGroups/acc-rg/providers/Microsoft.Web/sites/acc-app/sourcecontrols/web
    ");
    assert_eq!(
        app.web.site("acc-rg", "acc-app").unwrap().branch.as_deref(),
        Some("master")
    );

    Ok(())
}

#[tokio::test]
async fn test_import_then_destroy() -> anyhow::Result<()> {
    let test_dir = utils::TestDir::new()?;
    let app = setup(&test_dir);
    let cancel = CancellationToken::new();

    app.web
        .add_site("acc-rg", "legacy-app", "https://github.com/acme/legacy.git", "main");
    let id = utils::source_control_id("acc-rg", "legacy-app");

    let out = run_and_capture!(|out| app.cmd_import("legacy", &id, &cancel, out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @"Imported legacy: https://github.com/acme/legacy.git (main)");

    // Importing the same web app again under another name is refused
    let err = app
        .cmd_import("again", &id, &cancel, &mut Vec::new())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Web app legacy-app in resource group acc-rg is already managed as legacy"
    );

    let out = run_and_capture!(|out| app.cmd_destroy("legacy", &cancel, out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @"Destroyed legacy");
    assert_eq!(app.web.site("acc-rg", "legacy-app"), None);

    let err = app
        .cmd_destroy("legacy", &cancel, &mut Vec::new())
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("No binding named legacy in "));

    Ok(())
}

#[tokio::test]
async fn test_moving_to_another_app_replaces_binding() -> anyhow::Result<()> {
    let test_dir = utils::TestDir::new()?;
    let app = setup(&test_dir);
    let cancel = CancellationToken::new();

    let config = source_control("acc-app", "https://github.com/acme/a.git", "master");
    run_and_capture!(|out| app.cmd_apply("site", &config, &cancel, out));

    let config = source_control("acc-app-2", "https://github.com/acme/a.git", "master");
    let out = run_and_capture!(|out| app.cmd_apply("site", &config, &cancel, out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @r"
        Replacing site (changed: app_service_name)
        Applied site: /subscriptions/[SUB]/resourceGroups/acc-rg/providers/Microsoft.Web/sites/acc-app-2/sourcecontrols/web
    ");

    assert_eq!(app.web.site("acc-rg", "acc-app"), None);
    assert!(app.web.site("acc-rg", "acc-app-2").is_some());

    // A second binding may not manage the same web app
    let err = app
        .cmd_apply("other", &config, &cancel, &mut Vec::new())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Web app acc-app-2 in resource group acc-rg is already managed as site"
    );

    Ok(())
}

#[tokio::test]
async fn test_invalid_configuration_leaves_state_untouched() -> anyhow::Result<()> {
    let test_dir = utils::TestDir::new()?;
    let app = setup(&test_dir);
    let cancel = CancellationToken::new();

    let config = source_control("bad_name!", "https://github.com/acme/a.git", "master");
    assert!(
        app.cmd_apply("site", &config, &cancel, &mut Vec::new())
            .await
            .is_err()
    );
    assert!(app.web.calls().is_empty());

    let out = run_and_capture!(|out| app.cmd_show(out));
    assert_snapshot_filtered!(out, INSTA_FILTERS, @"No source control bindings in state");

    Ok(())
}
