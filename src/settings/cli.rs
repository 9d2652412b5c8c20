use super::Parser;

#[derive(Parser, Debug)]
pub struct Cli {
    /// Path to a settings file (TOML). Defaults to settings/dev.toml in debug builds.
    #[arg(long)]
    pub settings: Option<String>,
    /// Overrides `[log].filter` from the settings file.
    #[arg(long)]
    pub log_filter: Option<String>,
}
