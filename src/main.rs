//! kdd-clean - Main Entry Point

use clap::Parser;
use kdd_clean::cli::{cmd_clean, cmd_info, CleanArgs, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kdd_clean=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            data,
            output,
            holdout,
            holdout_output,
            config,
            decode_policy,
            legacy_section_shift,
            joint_encoding,
            drop_single_attempt,
            unit_map,
        } => {
            let holdout = match (holdout.as_deref(), holdout_output.as_deref()) {
                (Some(input), Some(out)) => Some((input, out)),
                _ => None,
            };
            cmd_clean(&CleanArgs {
                data: &data,
                output: &output,
                holdout,
                config: config.as_deref(),
                decode_policy: decode_policy.as_deref(),
                legacy_section_shift,
                joint_encoding,
                drop_single_attempt,
                unit_map: unit_map.as_deref(),
            })?;
        }
        Commands::Info { data, all, cleaned } => {
            cmd_info(&data, all, cleaned)?;
        }
    }

    Ok(())
}
