use tokenward::application_port::SessionConfig;
use tokenward::settings::*;

fn main() -> anyhow::Result<()> {
    // Load settings from the default location
    let project_settings = parse_settings(None)?;
    println!("Loaded settings: {:?}", project_settings);

    // Attempt to load from an invalid path (expected to fail)
    let is_err = parse_settings(Some("")).is_err();
    println!("Error on invalid path: {:?}", is_err);

    // Attempt to load from a custom path, with env overrides applied on top
    // $ TOKENWARD__SESSION__GRACE_PERIOD_MS=1000 cargo run --bin settings_demo -- --settings=settings/dev.toml
    let cli = Cli::parse();
    let project_settings = parse_settings(cli.settings.as_deref())?;
    println!("Loaded settings: {:?}", project_settings);

    let session_config = SessionConfig::try_from(&project_settings.session)?;
    println!("Session config: {:?}", session_config);

    Ok(())
}
