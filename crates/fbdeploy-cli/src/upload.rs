//! Upload subcommand: store a built archive in the bucket.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use fbdeploy_core::{DeployContext, DeployPlugin, ObjectStore};

/// Arguments for `fbdeploy upload`.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Path of the built archive.
    #[arg(long, value_name = "FILE")]
    pub archive: PathBuf,

    /// Object name to store it under (default: the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Execute the upload subcommand.
pub async fn run_upload<S: ObjectStore>(
    plugin: &DeployPlugin<S>,
    ctx: &DeployContext,
    args: &UploadArgs,
    out: &mut impl Write,
) -> Result<u8> {
    if !args.archive.is_file() {
        bail!("archive not found: {}", args.archive.display());
    }
    let ctx = DeployContext {
        archive_path: Some(args.archive.clone()),
        archive_name: args.name.clone(),
        ..ctx.clone()
    };
    let key = plugin
        .upload(&ctx)
        .await
        .with_context(|| format!("failed to upload {}", args.archive.display()))?;
    writeln!(out, "OK: uploaded {} to {}/{key}", args.archive.display(), plugin.store().bucket())?;
    Ok(0)
}
