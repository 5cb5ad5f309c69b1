//! Auto-label command

use std::sync::Arc;

use clap::Args;
use ferry_core::{Config, LabelSuggester, RateLimitGuard, Secrets, SystemClock};
use ferry_github::{autolabel, AutolabelOptions};
use ferry_llm::GeminiClient;

use crate::progress::PrintProgress;

/// Label unlabeled issues in the target repository
#[derive(Args, Debug)]
pub struct AutolabelArgs {
    /// Print the suggested labels without applying them
    #[arg(long)]
    pub dry_run: bool,
}

impl AutolabelArgs {
    /// Execute the autolabel command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let secrets = Secrets::load()?;
        // Both secrets are checked before any network call
        let api_key = secrets.require_gemini_api_key()?;
        secrets.require_github_token()?;

        let model = GeminiClient::from_config(api_key, &config.llm)?;
        println!("Using model {}", model.model());

        let client = super::connect(config.target_repo()?, &secrets).await?;

        let clock = Arc::new(SystemClock);
        let suggester = LabelSuggester::new(Arc::new(model), clock.clone())
            .with_policy(config.labeling.retry_policy());

        println!("\n--- Running Labeling Agent ---");
        let summary = autolabel(
            &client,
            &suggester,
            AutolabelOptions {
                dry_run: self.dry_run,
            },
            &RateLimitGuard::labeling(),
            clock.as_ref(),
            &mut PrintProgress,
        )
        .await?;

        println!("\n--- Labeling Agent Summary ---");
        println!("Unlabeled issues found: {}", summary.candidates);
        println!("Total issues processed: {}", summary.processed);
        println!("Successfully labeled: {}", summary.labeled);
        println!("Failed to label: {}", summary.failed);
        println!("----------------------------");

        Ok(())
    }
}
