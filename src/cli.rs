use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    #[command(subcommand)]
    pub(crate) command: SetupCommand,
    /// Settings file (defaults to the per-user `config.toml` when present)
    #[clap(long, global = true, env = "SETUP_MMOCK_CONFIG")]
    pub(crate) config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short, long, global = true, action = ArgAction::Count)]
    pub(crate) verbose: u8,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum SetupCommand {
    /// Resolves, installs and verifies MMock, then publishes the `mmock-bin` output
    Setup {
        /// `latest` or an explicit version, with or without a leading `v`
        #[clap(env = "INPUT_VERSION")]
        version: String,
        /// Token for the release metadata lookup when resolving `latest`
        #[clap(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
        github_token: Option<String>,
    },
    /// Prints the concrete version a version input resolves to
    Resolve {
        #[clap(env = "INPUT_VERSION")]
        version: String,
        #[clap(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
        github_token: Option<String>,
    },
    /// Prints the release asset URL for a version and platform
    Locate {
        #[clap(env = "INPUT_VERSION")]
        version: String,
        /// Target OS: linux, darwin (macos) or win32 (windows). Defaults to the host
        #[clap(long)]
        os: Option<String>,
        /// Target architecture: x64 or arm64. Defaults to the host
        #[clap(long)]
        arch: Option<String>,
        #[clap(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
        github_token: Option<String>,
    },
    /// Inspects or empties the local install cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum CacheAction {
    /// Lists cached installs
    List,
    /// Removes every cached install
    Clean,
}
