//! `uiforge generate` command implementation.
//!
//! Resolves every declared component against the schema snapshot and
//! regenerates its artifact, carrying safe-region edits over. A
//! failing component is reported and skipped; the command exits
//! nonzero if any component failed.

use std::path::Path;

use uiforge_codegen::Regenerator;
use uiforge_core::ComponentRegistry;

use super::load_config;

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = ComponentRegistry::from_config(&config)?;

    if registry.is_empty() {
        println!("No components declared. Add declarations to uiforge.yaml or components/.");
        return Ok(());
    }

    let report = Regenerator::default().run(&registry);

    for path in &report.written {
        println!("  wrote {}", path.display());
    }
    for failure in &report.failures {
        println!(
            "  FAILED {} ({}): {}",
            failure.component,
            failure.path.display(),
            failure.error
        );
    }
    println!(
        "Regenerated {} of {} component(s).",
        report.written.len(),
        registry.len()
    );

    if report.has_failures() {
        anyhow::bail!(
            "{} component(s) failed to regenerate; artifacts on disk were left untouched.",
            report.failures.len()
        );
    }
    Ok(())
}
