use std::{path::Path, sync::Arc};

use anyhow::Context;
use chrono::Local;
use fxhash::FxHashSet;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::{Config, CONFIG_PATH},
    delivery::TelegramChannel,
    keywords::{StopwordSet, TagExtractor},
    page_scrapers::{companies, ScrapeContext},
    pipeline::Pipeline,
    schedule::{DailyTrigger, Scheduler},
};

mod config;
mod delivery;
mod keywords;
mod page_scrapers;
mod pipeline;
mod report;
mod schedule;


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load(Path::new(CONFIG_PATH))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), config.log_level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting itjobs-alert v{}", env!("CARGO_PKG_VERSION"));

    let stopwords = match &config.stopwords_path {
        Some(path) => StopwordSet::from_file(path)?,
        None => StopwordSet::english(),
    };
    info!(count = stopwords.len(), "Loaded stopwords");

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build the HTTP client")?;

    let ctx = Arc::new(ScrapeContext {
        client: client.clone(),
        tags: TagExtractor::new(stopwords),
        keywords_per_job: config.keywords_per_job,
        skills_per_job: config.skills_per_job,
    });
    let enabled_scrapers: FxHashSet<String> = config.enabled_scrapers.iter().cloned().collect();
    let sources = companies::registry(ctx, &enabled_scrapers);
    info!(sources = sources.len(), "Registered career page scrapers");

    let pipeline = Pipeline {
        sources,
        channel: Arc::new(TelegramChannel::new(client, config.telegram.bot_token.clone())),
        chat_id: config.telegram.channel_id.clone(),
        parse_mode: config.telegram.parse_mode.clone(),
        max_segment_len: config.max_segment_len,
    };

    let trigger = DailyTrigger::new(config.daily_at()?, Local::now().naive_local());
    Scheduler::new(trigger)
        .run_forever(&pipeline, config.poll_interval())
        .await;

    Ok(())
}
