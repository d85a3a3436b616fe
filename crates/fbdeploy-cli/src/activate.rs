//! Activate subcommand: repoint the manifest at a revision.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use fbdeploy_core::{DeployContext, DeployPlugin, ObjectStore, RevisionData};

/// Arguments for `fbdeploy activate`.
#[derive(Args, Debug, Default)]
pub struct ActivateArgs {
    /// Revision to activate.
    #[arg(long)]
    pub revision: Option<String>,

    /// Revision recorded by an earlier pipeline step; used when
    /// `--revision` is absent.
    #[arg(long, env = "FBDEPLOY_REVISION_KEY", hide_env_values = true)]
    pub recorded_revision: Option<String>,
}

/// Execute the activate subcommand.
pub async fn run_activate<S: ObjectStore>(
    plugin: &DeployPlugin<S>,
    ctx: &DeployContext,
    args: &ActivateArgs,
    out: &mut impl Write,
) -> Result<u8> {
    let ctx = DeployContext {
        command_revision: args.revision.clone(),
        revision_data: args.recorded_revision.clone().map(|key| RevisionData {
            revision_key: Some(key),
        }),
        ..ctx.clone()
    };
    plugin.activate(&ctx).await.context("activation failed")?;

    let layout = plugin.layout(&ctx)?;
    writeln!(
        out,
        "OK: manifest {}/{} updated",
        plugin.store().bucket(),
        layout.manifest_key()
    )?;
    Ok(0)
}
