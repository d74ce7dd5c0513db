use crate::core::{EngineError, Matcher};
use crate::models::{Pairing, Participant, RunReport};
use crate::services::store::{ProfileStore, StoreError};
use crate::services::zulip::Notifier;
use chrono::Weekday;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a daily run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Profile store error: {0}")]
    Store(#[from] StoreError),

    #[error("Matching failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Matching task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Matching found no complete ordering within {0:?}")]
    Timeout(Duration),
}

/// Message bodies sent by the bot
#[derive(Debug, Clone)]
pub struct Messages {
    pub matched: String,
    pub odd_one_out: String,
    pub solo: String,
}

/// Key used for solo days in profiles
pub fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

/// Run the whole daily job: solo questions first, then pairing
///
/// # Arguments
/// * `store` - Where profiles are read from and skip flags reset
/// * `notifier` - Delivers every message; failures are counted, not fatal
/// * `matcher` - Engine configuration
/// * `budget` - Wall-clock limit for the search; past it the best ordering
///   found so far is delivered
/// * `messages` - Message bodies
/// * `today` - Weekday the solo flow runs for
pub async fn run_daily<S, N>(
    store: &S,
    notifier: &N,
    matcher: &Matcher,
    budget: Duration,
    messages: &Messages,
    today: Weekday,
) -> Result<RunReport, PipelineError>
where
    S: ProfileStore,
    N: Notifier,
{
    let mut report = RunReport {
        run_id: uuid::Uuid::new_v4().to_string(),
        weekday: weekday_key(today).to_string(),
        ..RunReport::default()
    };

    tracing::info!("Starting daily run {} ({})", report.run_id, report.weekday);

    message_solo(store, notifier, messages, today, &mut report).await?;
    message_pairs(store, notifier, matcher, budget, messages, &mut report).await?;

    tracing::info!(
        "Daily run {} finished: {} solo, {} pairs ({} compatible), {} failed notifications",
        report.run_id,
        report.solo_sent,
        report.pairs,
        report.compatible_pairs,
        report.failed_notifications
    );

    Ok(report)
}

async fn message_solo<S, N>(
    store: &S,
    notifier: &N,
    messages: &Messages,
    today: Weekday,
    report: &mut RunReport,
) -> Result<(), PipelineError>
where
    S: ProfileStore,
    N: Notifier,
{
    let solo = store.solo_profiles(weekday_key(today)).await?;

    // Skipping only lasts for one day
    for profile in store.skipping_profiles().await? {
        match store.set_skipping(&profile.id, false).await {
            Ok(()) => report.skippers_reset += 1,
            Err(e) => tracing::warn!("Failed to reset skip flag for {}: {}", profile.id, e),
        }
    }

    if solo.is_empty() {
        tracing::info!("No one signed up for a daily question");
        return Ok(());
    }

    for profile in &solo {
        if deliver(notifier, &[profile.email.as_str()], &messages.solo, report).await {
            report.solo_sent += 1;
        }
    }

    Ok(())
}

async fn message_pairs<S, N>(
    store: &S,
    notifier: &N,
    matcher: &Matcher,
    budget: Duration,
    messages: &Messages,
    report: &mut RunReport,
) -> Result<(), PipelineError>
where
    S: ProfileStore,
    N: Notifier,
{
    let profiles = store.pairing_profiles().await?;

    let mut participants: Vec<Participant> = Vec::with_capacity(profiles.len());
    for profile in &profiles {
        match profile.to_participant() {
            Some(participant) => participants.push(participant),
            None => {
                tracing::warn!("Skipping unconfigured profile {} for pairing", profile.id);
                report.skipped_unconfigured += 1;
            }
        }
    }

    report.participants = participants.len();
    if participants.is_empty() {
        tracing::info!("No one was signed up to pair today -- so there were no matches");
        return Ok(());
    }

    // Exhaustive search is CPU bound; keep it off the async workers
    let stop = Arc::new(AtomicBool::new(false));
    let engine = matcher.clone();
    let flag = Arc::clone(&stop);
    let mut search = tokio::task::spawn_blocking(move || engine.find_matches_until(participants, &flag));

    let result = match tokio::time::timeout(budget, &mut search).await {
        Ok(joined) => joined??,
        Err(_) => {
            tracing::warn!("Matching exceeded its {:?} budget, stopping the search", budget);
            stop.store(true, Ordering::Relaxed);
            match search.await? {
                Ok(result) => result,
                Err(EngineError::Cancelled) => return Err(PipelineError::Timeout(budget)),
                Err(e) => return Err(e.into()),
            }
        }
    };
    report.search_cancelled = result.cancelled;

    tracing::info!(
        "Matched {} participants with {} valid pairs",
        result.order.len(),
        result.valid_pairs
    );

    deliver_pairing(notifier, messages, &result.pairing, report).await;

    Ok(())
}

async fn deliver_pairing<N: Notifier>(
    notifier: &N,
    messages: &Messages,
    pairing: &Pairing,
    report: &mut RunReport,
) {
    if let Some(leftover) = &pairing.leftover {
        tracing::info!("Someone was the odd-one-out today");
        report.leftover = Some(leftover.id.clone());
        deliver(notifier, &[leftover.email.as_str()], &messages.odd_one_out, report).await;
    }

    for pair in &pairing.pairs {
        let recipients = [pair.first.email.as_str(), pair.second.email.as_str()];
        if deliver(notifier, &recipients, &messages.matched, report).await {
            tracing::info!("A match went out");
        }
        report.pairs += 1;
        if pair.compatible {
            report.compatible_pairs += 1;
        }
    }
}

/// Send one message, recording a failure instead of propagating it
async fn deliver<N: Notifier>(
    notifier: &N,
    recipients: &[&str],
    content: &str,
    report: &mut RunReport,
) -> bool {
    match notifier.send(recipients, content).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to notify {}: {}", recipients.join(", "), e);
            report.failed_notifications += 1;
            false
        }
    }
}
