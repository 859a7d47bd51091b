//! CLI argument parsing

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use vitrine_catalog::{CompatibilityFilter, StatusFilter};

#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(author, version, about = "Browse, vet and install NetBox plugins")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a config.yaml (default: ~/.vitrine/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List plugins with compatibility verdicts
    List(ListArgs),

    /// Show details for one plugin
    Info(InfoArgs),

    /// Install or upgrade a plugin
    Install(InstallArgs),

    /// Uninstall a plugin
    Uninstall(UninstallArgs),

    /// Re-check an installed plugin's declared compatibility
    Verify(VerifyArgs),

    /// Drop cached registry, inventory and curated data
    Refresh,

    /// Show installation attempt history
    History(HistoryArgs),

    /// List curated categories and certification levels
    Categories(CategoriesArgs),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only plugins in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Only plugins with this certification (certified, compatible, untested, deprecated)
    #[arg(long)]
    pub certification: Option<String>,

    /// Runtime status: installed, not-installed, activated, upgradable
    #[arg(long)]
    pub status: Option<StatusFilter>,

    /// Verdict: compatible, incompatible, unknown
    #[arg(long)]
    pub compatibility: Option<CompatibilityFilter>,

    /// Case-insensitive search in name, summary and author
    #[arg(short, long)]
    pub search: Option<String>,

    /// Include packages without a curated entry
    #[arg(long, conflicts_with = "curated_only")]
    pub all: bool,

    /// Only packages with a curated entry
    #[arg(long)]
    pub curated_only: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Package name
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Package name, optionally pinned as NAME==VERSION
    pub name: String,

    /// Version to install (default: latest)
    #[arg(long, value_name = "VERSION")]
    pub pin: Option<String>,

    /// User recorded in the attempt history (default: $USER)
    #[arg(long)]
    pub user: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InstallArgs {
    /// Package name and requested version
    ///
    /// `NAME==VERSION` in the positional argument is split; a `--pin` given
    /// alongside it must agree.
    pub fn requested(&self) -> Result<(&str, Option<&str>), String> {
        let (name, inline) = match self.name.split_once("==") {
            Some((name, version)) => (name.trim(), Some(version.trim())),
            None => (self.name.trim(), None),
        };
        if name.is_empty() || inline.is_some_and(str::is_empty) {
            return Err(format!("Invalid package requirement '{}'", self.name));
        }
        match (inline, self.pin.as_deref()) {
            (Some(a), Some(b)) if a != b => Err(format!(
                "Conflicting versions for {}: {} and --pin {}",
                name, a, b
            )),
            (Some(version), _) | (None, Some(version)) => Ok((name, Some(version))),
            (None, None) => Ok((name, None)),
        }
    }
}

#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Package name
    pub name: String,

    /// User recorded in the attempt history (default: $USER)
    #[arg(long)]
    pub user: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Package name
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only attempts for this package
    #[arg(long)]
    pub package: Option<String>,

    /// Maximum number of attempts
    #[arg(short = 'n', long, default_value_t = vitrine_catalog::attempts::DEFAULT_HISTORY_LIMIT)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
