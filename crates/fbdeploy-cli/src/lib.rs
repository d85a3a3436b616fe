//! # fbdeploy-cli — Deploy Pipeline CLI
//!
//! Provides the `fbdeploy` command-line interface over the deploy hooks in
//! `fbdeploy-core`, backed by S3.
//!
//! ## Subcommands
//!
//! - `fbdeploy upload --archive dist-abc123.zip` — store a built archive.
//! - `fbdeploy list [--initial] [--json]` — revision history, active flagged.
//! - `fbdeploy activate --revision abc123` — repoint the manifest.
//!
//! ## Configuration precedence
//!
//! Config file (`--config`, else `./fbdeploy.yaml` if present) <
//! environment < command-line flags.

pub mod activate;
pub mod list;
pub mod settings;
pub mod upload;

/// Archive prefix used when neither config nor flags name one; matches the
/// archive names the FastBoot build step produces.
pub const DEFAULT_ARCHIVE_PREFIX: &str = "dist-";

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "fbdeploy.yaml";
