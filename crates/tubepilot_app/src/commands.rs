use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tubepilot_core::constants::DEFAULT_SCHEDULES;
use tubepilot_core::{LogQuery, RemoteSchedulerConfig, SettingsPatch, UploadProgress, VideoMetadata};
use tubepilot_gateway::wire::{DownloadRequest, MetadataOverrides, ProcessRequest};
use tubepilot_gateway::{
    ensure_storage_dir, FileStore, GatewaySettings, KeyValueStore, ProgressSink,
};
use tubepilot_logging::{pilot_info, pilot_warn};
use tubepilot_tasks::{
    retry_with_backoff, LogsTask, QuotaTask, RetryPolicy, SchedulerTask, ScraperTask,
    SettingsTask, TaskContext, UploadTask,
};

use crate::cli::{
    Cli, Command, ConfigureArgs, LogsCommand, MetadataArgs, SchedulerCommand, SettingsCommand,
    SettingsSetArgs,
};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let storage = open_storage(&cli.state_dir)?;
    let mut settings = GatewaySettings::with_base_url(&cli.api_url)?;
    settings.request_timeout = Duration::from_secs(cli.timeout);
    pilot_info!("Using service at {}", settings.base_url);

    let ctx = TaskContext::connect(settings, storage)?;
    let retry = RetryPolicy {
        max_attempts: cli.retries.max(1),
        ..RetryPolicy::default()
    };

    match cli.command {
        Command::Login { token } => {
            ctx.store().sign_in(&token)?;
            let settings = SettingsTask::new(ctx.clone());
            if let Some(loaded) = settings.sync_with_auth().await {
                loaded.context("signed in, but loading remote settings failed")?;
            }
            println!("Signed in.");
        }
        Command::Logout => {
            ctx.store().sign_out();
            println!("Signed out.");
        }
        Command::Status => print_status(&ctx),
        Command::Scrape { urls } => {
            let task = ScraperTask::new(ctx.clone());
            if let [url] = urls.as_slice() {
                print_json(&task.scrape_one(url).await?)?;
            } else {
                print_json(&task.scrape_many(&urls).await?)?;
            }
        }
        Command::Download { url, quality } => {
            let request = DownloadRequest { url, quality };
            let (gateway, request) = (ctx.gateway(), &request);
            let response = retry_with_backoff(&retry, move |_| gateway.download(request)).await?;
            println!("{}", response.path);
        }
        Command::Process(args) => {
            let request = ProcessRequest {
                file_path: args.file_path,
                metadata: overrides(args.metadata),
            };
            let response = ctx.gateway().process(&request).await?;
            println!("{}", response.processed_path);
        }
        Command::Upload(args) => upload(&ctx, &args.file, args.metadata).await?,
        Command::Scheduler(command) => scheduler(&ctx, &retry, command).await?,
        Command::Quota => {
            let task = QuotaTask::new(ctx.clone());
            let task = &task;
            let quota = retry_with_backoff(&retry, move |_| task.load()).await?;
            print_json(&quota)?;
        }
        Command::Analytics => {
            let gateway = ctx.gateway();
            print_json(&retry_with_backoff(&retry, move |_| gateway.analytics()).await?)?;
        }
        Command::Settings(command) => settings_command(&ctx, &retry, command).await?,
        Command::Logs(command) => {
            let task = LogsTask::new(ctx.clone());
            match command {
                LogsCommand::List { limit, offset } => {
                    let task = &task;
                    let query = LogQuery::new(limit, offset);
                    let page = retry_with_backoff(&retry, move |_| task.load(query)).await?;
                    for entry in &page.logs {
                        println!(
                            "{} [{}] {}",
                            entry.timestamp.to_rfc3339(),
                            entry.level,
                            entry.message
                        );
                    }
                    println!("{} of {} entries", page.logs.len(), page.total);
                }
                LogsCommand::Clear => {
                    task.clear().await?;
                    println!("Logs cleared.");
                }
            }
        }
    }
    Ok(())
}

fn open_storage(dir: &Path) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    ensure_storage_dir(dir)
        .with_context(|| format!("cannot use state directory {}", dir.display()))?;
    Ok(Arc::new(FileStore::new(dir)))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_status(ctx: &TaskContext) {
    let state = ctx.store().snapshot();
    let settings = state.settings();
    let scheduler = state.scheduler();
    println!("authenticated: {}", state.is_authenticated());
    println!("channel: {}", display_or_unset(&settings.channel_id));
    println!("default privacy: {:?}", settings.default_privacy);
    println!("theme: {:?}", settings.theme);
    println!(
        "scheduler: {} ({})",
        if scheduler.running { "running" } else { "stopped" },
        scheduler.config.schedule
    );
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}

fn overrides(args: MetadataArgs) -> MetadataOverrides {
    MetadataOverrides {
        title: args.title,
        description: args.description,
        tags: (!args.tags.is_empty()).then_some(args.tags),
        category: args.category,
        privacy: args.privacy.map(Into::into),
    }
}

async fn upload(ctx: &TaskContext, file: &Path, args: MetadataArgs) -> anyhow::Result<()> {
    let default_privacy = ctx.store().read(|state| state.settings().default_privacy);
    let title = match args.title {
        Some(title) => title,
        None => file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string(),
    };
    let metadata = VideoMetadata {
        title,
        description: args.description.unwrap_or_default(),
        tags: args.tags,
        category: args.category.unwrap_or_default(),
        privacy: args.privacy.map(Into::into).unwrap_or(default_privacy),
        ..VideoMetadata::default()
    };

    if ctx.store().read(|state| state.is_authenticated()) {
        if let Err(err) = QuotaTask::new(ctx.clone()).load().await {
            pilot_warn!("Uploading without a known quota: {}", err);
        }
    }

    let task = UploadTask::new(ctx.clone());
    let on_progress: Arc<dyn ProgressSink> = Arc::new(|tick: UploadProgress| {
        eprint!("\r{:>3}% ({} / {} bytes)", tick.percentage, tick.loaded, tick.total);
    });
    let result = task.upload(file, metadata, Some(on_progress)).await;
    eprintln!();
    print_json(&result?)
}

async fn scheduler(
    ctx: &TaskContext,
    retry: &RetryPolicy,
    command: SchedulerCommand,
) -> anyhow::Result<()> {
    let task = SchedulerTask::new(ctx.clone());
    match command {
        SchedulerCommand::Status => {
            let task = &task;
            let status = retry_with_backoff(retry, move |_| task.refresh_status()).await?;
            print_json(&status)?;
        }
        SchedulerCommand::Start => {
            task.start().await?;
            println!("Scheduler started.");
        }
        SchedulerCommand::Stop => {
            task.stop().await?;
            println!("Scheduler stopped.");
        }
        SchedulerCommand::Config => {
            let task = &task;
            print_json(&retry_with_backoff(retry, move |_| task.load_config()).await?)?;
        }
        SchedulerCommand::Configure(args) => {
            task.update_config(remote_config(args)).await?;
            println!("Scheduler configuration saved.");
        }
        SchedulerCommand::Presets => {
            for (expression, label) in DEFAULT_SCHEDULES {
                println!("{expression:<14} {label}");
            }
        }
        SchedulerCommand::Watch { interval_secs } => {
            watch_scheduler(ctx, &task, Duration::from_secs(interval_secs.max(1))).await;
        }
    }
    Ok(())
}

fn remote_config(args: ConfigureArgs) -> RemoteSchedulerConfig {
    RemoteSchedulerConfig {
        enabled: !args.disabled,
        schedule: args.schedule,
        max_videos_per_day: args.max_videos_per_day,
        categories: args.categories.into_iter().collect(),
    }
}

async fn watch_scheduler(ctx: &TaskContext, task: &SchedulerTask, every: Duration) {
    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.cancel();
        }
    });

    let mut changes = ctx.store().subscribe();
    let report = async move {
        let mut last = None;
        while changes.changed().await.is_ok() {
            let scheduler = changes.borrow_and_update().scheduler().clone();
            let line = match scheduler.next_run {
                Some(next) => format!(
                    "running: {}, next run: {}",
                    scheduler.running,
                    next.to_rfc3339()
                ),
                None => format!("running: {}", scheduler.running),
            };
            if last.as_ref() != Some(&line) {
                println!("{line}");
                last = Some(line);
            }
        }
    };

    tokio::select! {
        refreshed = task.poll(every, cancel) => {
            pilot_info!("Stopped watching after {} refreshes", refreshed);
        }
        _ = report => {}
    }
}

async fn settings_command(
    ctx: &TaskContext,
    retry: &RetryPolicy,
    command: SettingsCommand,
) -> anyhow::Result<()> {
    let task = SettingsTask::new(ctx.clone());
    match command {
        SettingsCommand::Show => {
            if ctx.store().read(|state| state.is_authenticated()) {
                let task = &task;
                retry_with_backoff(retry, move |_| task.load()).await?;
            }
            let settings = task.settings();
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsCommand::Set(args) => {
            let patch = settings_patch(args);
            if patch.is_empty() {
                anyhow::bail!("nothing to change; pass at least one setting");
            }
            task.save(patch).await?;
            println!("Settings saved.");
        }
    }
    Ok(())
}

fn settings_patch(args: SettingsSetArgs) -> SettingsPatch {
    SettingsPatch {
        api_key: args.api_key,
        channel_id: args.channel_id,
        default_privacy: args.default_privacy.map(Into::into),
        auto_tags: args.auto_tags,
        notifications: args.notifications,
        theme: args.theme.map(Into::into),
    }
}
