use tokenward::logger::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap()?;
    trace!("bootstrap trace log");
    debug!("bootstrap debug log");
    info!("bootstrap info log");

    let config = LogConfig {
        filter: "debug".to_string(),
    };
    logger.reload_from_config(&config)?;
    trace!("application trace log");
    debug!(user_id = "42", "application debug log");
    info!("application info log");

    let bad = LogConfig {
        filter: "tokenward=notalevel".to_string(),
    };
    warn!(rejected = logger.reload_from_config(&bad).is_err(), "invalid filter");

    Ok(())
}
