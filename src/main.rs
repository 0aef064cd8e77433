//! bm-monitor CLI
//!
//! 监控 Brandmeister DMR last-heard 活动并推送通知

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use bm_monitor::notification::channels::{
    DapnetChannel, DiscordChannel, PushoverChannel, TelegramChannel,
};
use bm_monitor::{
    callbook, Callbook, ChannelDispatcher, Config, Decision, DecisionEngine, LastheardFeed,
    SessionRegistry,
};

#[derive(Parser)]
#[command(name = "bmon")]
#[command(about = "bm-monitor - 监控 Brandmeister last-heard 活动并推送通知")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行监控
    Run {
        /// 配置文件路径 (默认: ~/.config/bm-monitor/config.json)
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// 输出调试日志
        #[arg(long, short)]
        verbose: bool,
    },
    /// 校验配置和 dmrid 文件
    Check {
        /// 配置文件路径 (默认: ~/.config/bm-monitor/config.json)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(Config::default_path);
    Config::load(&path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, verbose } => {
            init_tracing(verbose);
            let config = load_config(config)?;
            run(config).await
        }
        Commands::Check { config } => check(load_config(config)?),
    }
}

/// 根据配置构建分发器
fn build_dispatcher(config: &Config, registry: Arc<SessionRegistry>) -> Result<ChannelDispatcher> {
    let mut dispatcher = ChannelDispatcher::new(registry, config.min_visible_secs);

    if let Some(settings) = &config.pushover {
        dispatcher.add_push(Arc::new(
            PushoverChannel::new(settings.clone()).context("pushover config invalid")?,
        ));
    }
    if let Some(settings) = &config.telegram {
        dispatcher.add_push(Arc::new(
            TelegramChannel::new(settings.clone()).context("telegram config invalid")?,
        ));
    }
    if let Some(settings) = &config.dapnet {
        dispatcher.add_push(Arc::new(
            DapnetChannel::new(settings.clone()).context("dapnet config invalid")?,
        ));
    }
    if let Some(settings) = &config.discord {
        dispatcher.add_session(Arc::new(
            DiscordChannel::new(settings.clone()).context("discord config invalid")?,
        ));
    }

    if dispatcher.channel_count() == 0 {
        warn!("no notification channels enabled");
    }
    Ok(dispatcher)
}

/// 运行监控：feed → 决策引擎 → 渠道分发
async fn run(config: Config) -> Result<()> {
    // 反查表加载失败不阻塞启动：先用空表，等下一轮刷新
    let book = match Callbook::load(&config.dmrid_file) {
        Ok(book) => {
            info!(entries = book.len(), file = %config.dmrid_file.display(), "dmrid table loaded");
            Arc::new(book)
        }
        Err(e) => {
            warn!(error = %e, "dmrid load failed, starting with empty table");
            Arc::new(Callbook::empty())
        }
    };
    tokio::spawn(callbook::refresh_loop(
        Arc::clone(&book),
        config.dmrid_file.clone(),
        config.dmrid_refresh_secs,
    ));

    let registry = Arc::new(SessionRegistry::new());
    let dispatcher = build_dispatcher(&config, Arc::clone(&registry))?;
    let mut engine = DecisionEngine::new(config.watch_config(), book);

    let (tx, mut rx) = mpsc::channel(256);
    let feed = LastheardFeed::new(config.feed_url.clone(), tx);
    tokio::spawn(async move { feed.run().await });

    info!(
        callsigns = config.callsigns.len(),
        talkgroups = config.talkgroups.len(),
        channels = dispatcher.channel_count(),
        "monitoring last-heard activity"
    );

    // 单消费者循环：逐条按到达顺序处理
    while let Some(record) = rx.recv().await {
        let session_id = record.session_id;
        let talkgroup = record.destination_id;
        let now = Utc::now().timestamp().max(0) as u64;
        let session_open = registry.session_open(session_id);

        match engine.evaluate(record, now, session_open) {
            Decision::Notify(event) => {
                info!(
                    callsign = %event.record.source_call,
                    talkgroup,
                    session_id,
                    phase = ?event.phase,
                    "notifying"
                );
                dispatcher.dispatch(&event).await;
            }
            Decision::Suppress(reason) => {
                debug!(session_id, talkgroup, reason = reason.as_str(), "suppressed");
            }
        }
    }

    Ok(())
}

/// 校验配置，打印摘要
fn check(config: Config) -> Result<()> {
    config.validate()?;

    println!("callsigns:  {}", config.callsigns.len());
    println!("talkgroups: {}", config.talkgroups.len());
    println!("noisy:      {}", config.noisy_calls.len());
    println!("silence:    {}s", config.min_silence_secs);
    println!("visible:    {}s", config.min_visible_secs);
    println!("channels:   {}", config.enabled_channels().join(", "));

    match Callbook::load(&config.dmrid_file) {
        Ok(book) => println!("dmrid:      {} entries", book.len()),
        Err(e) => println!("dmrid:      unavailable ({})", e),
    }

    println!("config ok");
    Ok(())
}
