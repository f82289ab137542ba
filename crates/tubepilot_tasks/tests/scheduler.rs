mod common;

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use tubepilot_core::{Phase, RemoteSchedulerConfig, SchedulerState, SchedulerStatus};
use tubepilot_gateway::FailureKind;
use tubepilot_tasks::SchedulerTask;

use common::fixture;

fn remote_config(schedule: &str, max: u32) -> RemoteSchedulerConfig {
    RemoteSchedulerConfig {
        enabled: true,
        schedule: schedule.to_string(),
        max_videos_per_day: max,
        categories: BTreeSet::from(["gaming".to_string()]),
    }
}

#[tokio::test]
async fn mount_mirrors_remote_status() {
    let fx = fixture();
    let next = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    fx.gateway.scheduler_status.ok(SchedulerStatus {
        running: true,
        next_run: Some(next),
    });

    let task = SchedulerTask::mount(fx.ctx.clone()).await;
    let state = task.state();

    assert!(state.running);
    assert_eq!(state.next_run, Some(next));
    assert_eq!(task.phase(), Phase::Succeeded);
}

#[tokio::test]
async fn failed_mount_keeps_local_state() {
    let fx = fixture();
    fx.gateway
        .scheduler_status
        .fail(FailureKind::Network, "connection refused");

    let task = SchedulerTask::mount(fx.ctx.clone()).await;

    assert_eq!(task.state(), SchedulerState::default());
    assert!(task.error().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn absent_next_run_clears_local_value() {
    let fx = fixture();
    let next = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    fx.gateway.scheduler_status.ok(SchedulerStatus {
        running: true,
        next_run: Some(next),
    });
    fx.gateway.scheduler_status.ok(SchedulerStatus {
        running: false,
        next_run: None,
    });
    let task = SchedulerTask::new(fx.ctx.clone());

    task.refresh_status().await.unwrap();
    task.refresh_status().await.unwrap();

    assert!(!task.state().running);
    assert_eq!(task.state().next_run, None);
}

#[tokio::test]
async fn start_mirrors_only_after_success() {
    let fx = fixture();
    fx.gateway
        .start_scheduler
        .fail(FailureKind::Server, "worker pool exhausted");
    fx.gateway.start_scheduler.ok(());
    fx.gateway.stop_scheduler.ok(());
    let task = SchedulerTask::new(fx.ctx.clone());

    task.start().await.unwrap_err();
    assert!(!task.state().running);

    task.start().await.unwrap();
    assert!(task.state().running);
    assert_eq!(task.error(), None);

    task.stop().await.unwrap();
    assert!(!task.state().running);
}

#[tokio::test]
async fn update_config_mirrors_after_success() {
    let fx = fixture();
    fx.gateway.update_scheduler_config.ok(());
    let task = SchedulerTask::new(fx.ctx.clone());
    let config = remote_config("0 */6 * * *", 4);

    task.update_config(config.clone()).await.unwrap();

    let state = task.state();
    assert!(state.enabled);
    assert_eq!(state.config, config.config());
}

#[tokio::test]
async fn rejected_config_leaves_state_untouched() {
    let fx = fixture();
    fx.gateway
        .update_scheduler_config
        .fail(FailureKind::Validation, "categories unknown");
    let task = SchedulerTask::new(fx.ctx.clone());

    task.update_config(remote_config("0 12 * * *", 3))
        .await
        .unwrap_err();

    assert_eq!(task.state(), SchedulerState::default());
    assert_eq!(task.phase(), Phase::Failed);
}

#[tokio::test]
async fn invalid_config_never_reaches_the_gateway() {
    let fx = fixture();
    let task = SchedulerTask::new(fx.ctx.clone());

    let err = task
        .update_config(remote_config("0 9 * *", 3))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Validation);

    let err = task
        .update_config(remote_config("0 9 * * *", 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Validation);

    assert!(fx.gateway.calls().is_empty());
}

#[tokio::test]
async fn load_config_mirrors_remote_config() {
    let fx = fixture();
    let config = remote_config("0 18 * * *", 7);
    fx.gateway.scheduler_config.ok(config.clone());
    let task = SchedulerTask::new(fx.ctx.clone());

    task.load_config().await.unwrap();

    assert_eq!(task.state().config, config.config());
}

#[tokio::test]
async fn poll_refreshes_until_cancelled() {
    let fx = fixture();
    for running in [true, false] {
        fx.gateway.scheduler_status.ok(SchedulerStatus {
            running,
            next_run: None,
        });
    }
    fx.gateway
        .scheduler_status
        .fail(FailureKind::Network, "flaky");
    let task = SchedulerTask::new(fx.ctx.clone());
    let cancel = CancellationToken::new();

    let (refreshed, ()) = tokio::join!(task.poll(Duration::from_millis(10), cancel.clone()), async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        cancel.cancel();
    });

    assert_eq!(refreshed, 2);
    assert!(fx.gateway.calls().len() >= 3);
}

#[tokio::test]
async fn poll_with_cancelled_token_does_nothing() {
    let fx = fixture();
    let task = SchedulerTask::new(fx.ctx.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert_eq!(task.poll(Duration::from_millis(10), cancel).await, 0);
    assert!(fx.gateway.calls().is_empty());
}
