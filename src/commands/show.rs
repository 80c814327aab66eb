use anyhow::Result;
use colored::Colorize;

use crate::App;
use crate::clients::web_apps::WebAppsOps;
use crate::state::StateFile;

impl<W: WebAppsOps> App<W> {
    /// Print the bindings recorded in state. Makes no remote calls.
    pub async fn cmd_show(&self, stdout: &mut impl std::io::Write) -> Result<()> {
        let state = StateFile::load(&self.config.state_path).await?;

        if state.bindings.is_empty() {
            writeln!(stdout, "No source control bindings in state")?;
            return Ok(());
        }

        for (name, binding) in &state.bindings {
            // Name (cyan), repository and branch on the first line
            let repo_url = binding.repo_url.as_deref().unwrap_or("<unknown repository>");
            let branch = binding.branch.as_deref().unwrap_or("<unknown branch>");
            writeln!(stdout, "{} {} ({})", name.cyan(), repo_url, branch)?;

            // ID on the second line, dimmed
            let id_line = format!("  {}", binding.id);
            writeln!(stdout, "{}", id_line.dimmed())?;
        }
        Ok(())
    }
}
