//! TOML settings (with `TOKENWARD__*` environment overrides) and the command
//! line shared by the demo binaries. See `bin/settings_demo.rs`.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
