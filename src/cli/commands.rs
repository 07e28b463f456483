use std::sync::Arc;

use crate::app::context::open_store;
use crate::app::{AppContext, BotError, Result};
use crate::classifier::{classify, domain_of};
use crate::config::{parse_interval, Config};
use crate::poller::Poller;
use crate::store::SeenStore;

pub async fn run(mut config: Config, interval: Option<&str>) -> Result<()> {
    if let Some(raw) = interval {
        config.poller.interval_secs = parse_interval(raw)?;
    }

    let ctx = Arc::new(AppContext::from_config(&config)?);
    let poller = Poller::new(ctx, config.poller, config.workers);
    poller.run().await;
    Ok(())
}

pub async fn once(config: Config) -> Result<()> {
    let ctx = Arc::new(AppContext::from_config(&config)?);
    let poller = Poller::new(ctx, config.poller, config.workers);
    let stats = poller.run_once().await;

    println!(
        "Swept {} feeds ({} failed): {} items, {} queued",
        stats.feeds_ok + stats.feeds_failed,
        stats.feeds_failed,
        stats.items_seen,
        stats.items_queued
    );
    Ok(())
}

pub fn classify_link(url: &str, domain: Option<&str>) -> Result<()> {
    let domain = match domain {
        Some(d) => d.to_string(),
        None => domain_of(url).ok_or_else(|| BotError::BadLink(url.to_string()))?,
    };

    let kinds = classify(url, &domain);
    if kinds.is_empty() {
        println!("{} ({}): no match", url, domain);
    } else {
        let names: Vec<_> = kinds.iter().map(|k| k.as_str()).collect();
        println!("{} ({}): {}", url, domain, names.join(", "));
    }
    Ok(())
}

pub fn seen(config: &Config, id: &str) -> Result<()> {
    let store = open_store(config)?;
    match store.seen_at(id)? {
        Some(at) => println!("{} seen at {}", id, at.format("%Y-%m-%d %H:%M:%S UTC")),
        None if store.exists(id)? => println!("{} seen", id),
        None => println!("{} not seen", id),
    }
    Ok(())
}

pub fn mark(config: &Config, id: &str) -> Result<()> {
    let store = open_store(config)?;
    if store.mark_seen(id)? {
        println!("Marked {} as seen", id);
    } else {
        println!("{} was already marked", id);
    }
    Ok(())
}
