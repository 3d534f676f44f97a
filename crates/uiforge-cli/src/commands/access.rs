//! `uiforge access` command implementation.

use std::path::Path;

use clap::Subcommand;

use uiforge_core::ComponentRegistry;
use uiforge_policy::aggregate;

use super::load_config;

#[derive(Subcommand, Debug)]
pub enum AccessCommand {
    /// Print the consolidated access policy folded from all component
    /// declarations, per model.
    Show {
        /// Restrict the output to one model.
        #[arg(long)]
        model: Option<String>,
    },
}

pub async fn run(config_path: &Path, cmd: AccessCommand) -> anyhow::Result<()> {
    let AccessCommand::Show { model } = cmd;

    let config = load_config(config_path)?;
    let registry = ComponentRegistry::from_config(&config)?;
    let policies = aggregate(registry.descriptors());

    match model {
        Some(name) => {
            let access = policies.get(&name).ok_or_else(|| {
                anyhow::anyhow!("No component declares model '{}'", name)
            })?;
            print!("{}", serde_yaml::to_string(access)?);
        }
        None => {
            if policies.is_empty() {
                println!("No components declared; access policy is empty.");
                return Ok(());
            }
            print!("{}", serde_yaml::to_string(&policies)?);
        }
    }

    Ok(())
}
