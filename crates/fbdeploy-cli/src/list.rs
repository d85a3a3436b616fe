//! # List Subcommand
//!
//! Prints the revision history, newest first, with the active revision
//! marked. `--json` emits the hook result shape (`{"revisions": [...]}` or
//! `{"initialRevisions": [...]}` with `--initial`).

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use fbdeploy_core::{DeployContext, DeployPlugin, ObjectStore, RevisionEntry};

/// Arguments for `fbdeploy list`.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Report as the pre-deploy snapshot (`initialRevisions`).
    #[arg(long)]
    pub initial: bool,

    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Execute the list subcommand.
pub async fn run_list<S: ObjectStore>(
    plugin: &DeployPlugin<S>,
    ctx: &DeployContext,
    args: &ListArgs,
    out: &mut impl Write,
) -> Result<u8> {
    let revisions = if args.initial {
        let list = plugin
            .fetch_initial_revisions(ctx)
            .await
            .context("failed to fetch initial revisions")?;
        if args.json {
            serde_json::to_writer_pretty(&mut *out, &list)?;
            writeln!(out)?;
            return Ok(0);
        }
        list.initial_revisions
    } else {
        let list = plugin
            .fetch_revisions(ctx)
            .await
            .context("failed to fetch revisions")?;
        if args.json {
            serde_json::to_writer_pretty(&mut *out, &list)?;
            writeln!(out)?;
            return Ok(0);
        }
        list.revisions
    };

    write_table(&revisions, out)?;
    Ok(0)
}

fn write_table(revisions: &[RevisionEntry], out: &mut impl Write) -> Result<()> {
    if revisions.is_empty() {
        writeln!(out, "no revisions found")?;
        return Ok(());
    }
    let width = revisions
        .iter()
        .map(|r| r.revision.as_str().len())
        .max()
        .unwrap_or(0)
        .max("REVISION".len());
    writeln!(out, "  {:<width$}  UPLOADED", "REVISION")?;
    for r in revisions {
        let marker = if r.active { '*' } else { ' ' };
        writeln!(
            out,
            "{marker} {:<width$}  {}",
            r.revision.as_str(),
            r.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
    }
    Ok(())
}
