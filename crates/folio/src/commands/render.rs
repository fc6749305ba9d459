//! `folio render` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::Config;
use folio_containers::presets::Presets;
use folio_markdown::{EngineOptions, MarkdownEngine};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the markdown file.
    markdown_file: PathBuf,

    /// Write HTML here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or a file cannot be
    /// read or written. Content problems are reported as warnings.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let md = build_engine(&config);

        let source = std::fs::read_to_string(&self.markdown_file)?;
        tracing::debug!(file = %self.markdown_file.display(), bytes = source.len(), "Rendering markdown");
        let result = md.render(&source);
        if !result.warnings.is_empty() {
            tracing::info!(warnings = result.warnings.len(), "Rendered with diagnostics");
        }

        output.diagnostics(&self.markdown_file.display().to_string(), &result.warnings);

        match &self.output {
            Some(path) => {
                std::fs::write(path, &result.html)?;
                output.success(&format!(
                    "Rendered {} -> {}",
                    self.markdown_file.display(),
                    path.display()
                ));
            }
            None => output.print(&result.html),
        }

        Ok(())
    }
}

/// Engine with the presets enabled in `config`.
pub(crate) fn build_engine(config: &Config) -> MarkdownEngine {
    let mut md = MarkdownEngine::with_options(EngineOptions {
        max_nesting: config.markdown.max_nesting,
    });
    md.use_plugin(&Presets::from_features(&config.features));
    md
}
