//! Walks one session through its whole lifecycle against the configured store.
//!
//! With the memory backend this runs standalone. With redis, start a server
//! first and point `[store].redis_url` at it:
//!
//! ```text
//! $ cargo run --bin session_demo -- --settings=settings/release.toml
//! ```
//!
//! To watch a refresh happen, shrink the windows from the environment:
//!
//! ```text
//! $ TOKENWARD__SESSION__DURATION_MS=200 TOKENWARD__SESSION__GRACE_PERIOD_MS=2000 \
//!     cargo run --bin session_demo
//! ```

use futures_util::future::join_all;
use std::time::Duration;
use tokenward::app::App;
use tokenward::application_port::*;
use tokenward::domain_model::UserId;
use tokenward::logger::*;
use tokenward::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap()?;

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let mut logger_config = LogConfig::from(&project_settings.log);
    if let Some(filter) = cli.log_filter {
        logger_config.filter = filter;
    }
    logger.reload_from_config(&logger_config)?;

    let app = App::try_new(&project_settings).await?;
    let sessions = app.session_service.clone();

    // region issue and verify

    let user_ids: Vec<UserId> = (1..=3u64).map(UserId::from).collect();
    let created = join_all(
        user_ids
            .iter()
            .map(|user_id| sessions.create_session(user_id.clone())),
    )
    .await;

    let mut tokens = Vec::new();
    for result in created {
        let session = result?;
        println!(
            "created: user={} expires_at={}",
            session.user_id, session.expires_at
        );
        tokens.push(session.token);
    }

    for token in &tokens {
        let outcome = sessions.verify_session(token.as_str()).await?;
        println!("verify -> {:?}", outcome);
    }

    // endregion

    // region refresh

    let wait = Duration::from_millis(project_settings.session.duration_ms);
    if wait <= Duration::from_secs(5) {
        tokio::time::sleep(wait).await;
        match sessions.verify_session(tokens[0].as_str()).await {
            Ok(VerifyOutcome::Refreshed(fresh)) => {
                println!("refreshed: new expires_at={}", fresh.expires_at);
                tokens[0] = fresh.token;
            }
            other => println!("expected a refresh, got {:?}", other),
        }
    } else {
        println!("session_duration too long to wait for a refresh; skipping");
    }

    // endregion

    // region logout

    for token in &tokens {
        sessions.end_session(token.as_str()).await?;
    }
    match sessions.verify_session(tokens[0].as_str()).await {
        Err(e) => println!("after logout -> {} (terminal: {})", e, e.is_terminal()),
        Ok(outcome) => println!("unexpected: {:?}", outcome),
    }

    // endregion

    match tokio::time::timeout(Duration::from_secs(5), app.shutdown()).await {
        Ok(_) => info!("shutdown complete"),
        Err(_) => error!("shutdown timed out"),
    }

    Ok(())
}
