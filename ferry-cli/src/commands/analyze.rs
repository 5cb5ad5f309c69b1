//! Structure analysis command

use std::path::PathBuf;

use clap::Args;
use ferry_core::{structure, Config, DataFile, JsonStore};

/// Describe the layout of a local checkout
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Root of the checkout to analyse
    pub dir: PathBuf,
}

impl AnalyzeArgs {
    /// Execute the analyze command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if !self.dir.is_dir() {
            anyhow::bail!("Directory not found: {}", self.dir.display());
        }

        println!("Analyzing repository structure at {}...", self.dir.display());
        let report = structure::analyze(&self.dir)?;

        println!("Detected languages: {}", report.detected_languages.join(", "));
        for (category, count) in &report.file_counts {
            if *count > 0 {
                println!("  {}: {}", category, count);
            }
        }

        let store = JsonStore::new(&config.paths.data_dir);
        let path = store.write_document(DataFile::StructureAnalysis, &report)?;
        println!("Analysis saved to {}", path.display());

        Ok(())
    }
}
