mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use tubepilot_core::Phase;
use tubepilot_gateway::FailureKind;
use tubepilot_tasks::ScraperTask;

use common::{fixture, scraped};

#[tokio::test]
async fn scrape_one_appends_result() {
    let fx = fixture();
    fx.gateway.scrape.ok(scraped("https://example.com/a", "A"));
    let task = ScraperTask::new(fx.ctx.clone());

    let result = task.scrape_one("https://example.com/a").await.unwrap();

    assert_eq!(result.title, "A");
    assert_eq!(task.results(), vec![result]);
    assert_eq!(task.phase(), Phase::Succeeded);
    assert!(!task.loading());
    assert_eq!(task.error(), None);
}

#[tokio::test]
async fn failing_batch_merges_nothing() {
    let fx = fixture();
    fx.gateway.scrape.ok(scraped("https://example.com/a", "A"));
    fx.gateway
        .scrape_batch
        .fail(FailureKind::Server, "scraper crashed");
    let task = ScraperTask::new(fx.ctx.clone());

    task.scrape_one("https://example.com/a").await.unwrap();
    let err = task
        .scrape_many(&[
            "https://example.com/b".to_string(),
            "https://example.com/c".to_string(),
        ])
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Server);
    assert_eq!(task.results().len(), 1);
    assert_eq!(task.phase(), Phase::Failed);
    assert!(task.error().unwrap().contains("scraper crashed"));
}

#[tokio::test]
async fn batch_results_are_appended() {
    let fx = fixture();
    fx.gateway.scrape_batch.ok(vec![
        scraped("https://example.com/b", "B"),
        scraped("https://example.com/c", "C"),
    ]);
    let task = ScraperTask::new(fx.ctx.clone());

    task.scrape_many(&[
        "https://example.com/b".to_string(),
        "https://example.com/c".to_string(),
    ])
    .await
    .unwrap();

    let titles: Vec<String> = task.results().into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["B", "C"]);
}

#[tokio::test]
async fn invalid_urls_never_reach_the_gateway() {
    let fx = fixture();
    let task = ScraperTask::new(fx.ctx.clone());

    let err = task.scrape_one("not a url").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Validation);

    let err = task.scrape_many(&[]).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Validation);

    assert!(fx.gateway.calls().is_empty());
    assert!(task.error().is_some());
}

#[tokio::test]
async fn overlapping_scrapes_append_in_finishing_order() {
    let fx = fixture();
    fx.gateway.scrape.push(
        Duration::from_millis(60),
        Ok(scraped("https://example.com/slow", "slow")),
    );
    fx.gateway
        .scrape
        .ok(scraped("https://example.com/fast", "fast"));
    let task = ScraperTask::new(fx.ctx.clone());

    let (slow, fast) = tokio::join!(
        task.scrape_one("https://example.com/slow"),
        task.scrape_one("https://example.com/fast"),
    );
    slow.unwrap();
    fast.unwrap();

    let titles: Vec<String> = task.results().into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["fast", "slow"]);
    assert_eq!(task.in_flight(), 0);
    assert!(!task.loading());
}

#[tokio::test]
async fn clear_empties_results_and_error() {
    let fx = fixture();
    fx.gateway.scrape.ok(scraped("https://example.com/a", "A"));
    fx.gateway.scrape.fail(FailureKind::Network, "offline");
    let task = ScraperTask::new(fx.ctx.clone());

    task.scrape_one("https://example.com/a").await.unwrap();
    task.scrape_one("https://example.com/b").await.unwrap_err();
    task.clear();

    assert!(task.results().is_empty());
    assert_eq!(task.error(), None);

    task.reset();
    assert_eq!(task.phase(), Phase::Idle);
}
