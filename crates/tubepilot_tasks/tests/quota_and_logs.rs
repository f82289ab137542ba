mod common;

use pretty_assertions::assert_eq;
use tubepilot_core::{LogQuery, Phase};
use tubepilot_gateway::FailureKind;
use tubepilot_tasks::{LogsTask, QuotaTask};

use common::{fixture, log_page, quota};

#[tokio::test]
async fn quota_loads_on_authentication_edge() {
    let fx = fixture();
    fx.gateway.quota.ok(quota(10_000, 1_600));
    let task = QuotaTask::new(fx.ctx.clone());

    assert!(task.sync_with_auth().await.is_none());
    fx.ctx.store().sign_in("tok").unwrap();
    let loaded = task.sync_with_auth().await.unwrap().unwrap();

    assert_eq!(task.quota(), Some(loaded));
    assert!(task.sync_with_auth().await.is_none());
}

#[tokio::test]
async fn quota_is_replaced_wholesale() {
    let fx = fixture();
    fx.gateway.quota.ok(quota(10_000, 1_600));
    let mut inconsistent = quota(10_000, 3_200);
    inconsistent.remaining = 9_999;
    fx.gateway.quota.ok(inconsistent.clone());
    let task = QuotaTask::new(fx.ctx.clone());

    task.load().await.unwrap();
    task.load().await.unwrap();

    assert_eq!(task.quota(), Some(inconsistent));
}

#[tokio::test]
async fn quota_failure_keeps_previous_value() {
    let fx = fixture();
    let first = quota(10_000, 0);
    fx.gateway.quota.ok(first.clone());
    fx.gateway.quota.fail(FailureKind::Network, "timed out");
    let task = QuotaTask::new(fx.ctx.clone());

    task.load().await.unwrap();
    task.load().await.unwrap_err();

    assert_eq!(task.quota(), Some(first));
    assert_eq!(task.phase(), Phase::Failed);
    assert!(task.error().unwrap().contains("timed out"));
}

#[tokio::test]
async fn log_pages_replace_each_other() {
    let fx = fixture();
    fx.gateway.logs.ok(log_page(&["first", "second"], 3));
    fx.gateway.logs.ok(log_page(&["third"], 3));
    let task = LogsTask::new(fx.ctx.clone());

    task.load(LogQuery::new(2, 0)).await.unwrap();
    task.load(LogQuery::new(2, 2)).await.unwrap();

    let messages: Vec<String> = task.entries().into_iter().map(|e| e.message).collect();
    assert_eq!(messages, vec!["third"]);
    assert_eq!(task.total(), 3);
}

#[tokio::test]
async fn mount_loads_first_page() {
    let fx = fixture();
    fx.gateway.logs.ok(log_page(&["boot"], 1));

    let task = LogsTask::mount(fx.ctx.clone()).await;

    assert_eq!(task.entries().len(), 1);
    assert_eq!(fx.gateway.calls(), vec!["logs"]);
}

#[tokio::test]
async fn clear_empties_only_after_success() {
    let fx = fixture();
    fx.gateway.logs.ok(log_page(&["a", "b"], 2));
    fx.gateway.clear_logs.fail(FailureKind::Server, "read-only");
    fx.gateway.clear_logs.ok(());
    let task = LogsTask::new(fx.ctx.clone());

    task.load(LogQuery::default()).await.unwrap();
    task.clear().await.unwrap_err();
    assert_eq!(task.entries().len(), 2);
    assert_eq!(task.total(), 2);

    task.clear().await.unwrap();
    assert!(task.entries().is_empty());
    assert_eq!(task.total(), 0);
    assert_eq!(task.error(), None);
}
