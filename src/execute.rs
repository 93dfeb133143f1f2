use anyhow::{Context, Result};
use colored::Colorize;
use setup_mmock::{
    GitHubRegistry, Installer, LocalCacheStore, Platform, Settings, Verifier, VersionSpec,
    Workflow, locate, resolve_version,
};

use crate::cli::{CLI, CacheAction, SetupCommand};

pub fn execute(cli: CLI) -> Result<()> {
    let settings = Settings::discover(cli.config.as_deref())?;
    match cli.command {
        SetupCommand::Setup {
            version,
            github_token,
        } => execute_setup(&settings, &version, token(github_token.as_deref())),
        SetupCommand::Resolve {
            version,
            github_token,
        } => execute_resolve(&settings, &version, token(github_token.as_deref())),
        SetupCommand::Locate {
            version,
            os,
            arch,
            github_token,
        } => execute_locate(
            &settings,
            &version,
            os.as_deref(),
            arch.as_deref(),
            token(github_token.as_deref()),
        ),
        SetupCommand::Cache { action } => execute_cache(&settings, action),
    }
}

/// Runner inputs are always set; an empty token means none was given.
fn token(raw: Option<&str>) -> Option<&str> {
    raw.filter(|t| !t.is_empty())
}

fn registry(settings: &Settings) -> Result<GitHubRegistry> {
    GitHubRegistry::new(settings.api_url()).context("Could not create the HTTP client")
}

pub fn execute_setup(settings: &Settings, version: &str, token: Option<&str>) -> Result<()> {
    let registry = registry(settings)?;
    let cache = LocalCacheStore::new(settings.cache_dir()?);
    let platform = Platform::detect()?;
    let mut workflow = Workflow::from_env();

    let version = resolve_version(version, &registry, token)?;

    let installer = Installer::new(&registry, &cache, platform, settings.temp_root());
    workflow.group("💾 Install MMock", |wf| installer.install(&version, wf))?;

    let verifier = Verifier::mmock()?;
    workflow.group("🧪 Installation check", |wf| verifier.verify(wf))?;
    Ok(())
}

pub fn execute_resolve(settings: &Settings, version: &str, token: Option<&str>) -> Result<()> {
    let registry = registry(settings)?;
    let version = resolve_version(version, &registry, token)?;
    println!("{version}");
    Ok(())
}

pub fn execute_locate(
    settings: &Settings,
    raw_version: &str,
    os: Option<&str>,
    arch: Option<&str>,
    token: Option<&str>,
) -> Result<()> {
    let platform = match (os, arch) {
        (None, None) => Platform::detect()?,
        (os, arch) => Platform::parse(
            os.unwrap_or(std::env::consts::OS),
            arch.unwrap_or(std::env::consts::ARCH),
        )?,
    };

    // only `latest` needs the network
    let version = match VersionSpec::parse(raw_version)? {
        VersionSpec::Exact(version) => version,
        VersionSpec::Latest => resolve_version(raw_version, &registry(settings)?, token)?,
    };

    let artifact = locate(&platform, &version)?;
    log::debug!("{} {} -> {}", platform, version, artifact.asset);
    println!("{}", artifact.url);
    Ok(())
}

pub fn execute_cache(settings: &Settings, action: CacheAction) -> Result<()> {
    let cache = LocalCacheStore::new(settings.cache_dir()?);
    match action {
        CacheAction::List => {
            let entries = cache.entries()?;
            if entries.is_empty() {
                println!("No cached installs in {}", cache.root().display());
                return Ok(());
            }
            for entry in entries {
                println!("{}", entry.key.bold());
                println!("  files: {}", entry.files);
                println!("  saved at: {}", entry.saved_at);
            }
        }
        CacheAction::Clean => {
            cache.clear()?;
            println!("Cleared {}", cache.root().display());
        }
    }
    Ok(())
}
