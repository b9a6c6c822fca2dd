use std::time::Duration;

use anyhow::{Context, Result};
use bodyscan_client::cli::{Cli, Commands, ScanArgs};
use bodyscan_client::history::AnalysisCard;
use bodyscan_client::{
    AnalysisClient, CaptureCoordinator, CaptureOutcome, CaptureStatus, HistoryLoader,
    HistoryTimeline, LogRenderer, PoseOptions, ReplaySource, ScanController,
};
use bodyscan_core::CapturePolicy;
use clap::Parser;
use tokio::time::{interval, Interval, MissedTickBehavior};

async fn next_tick(ticker: &mut Option<Interval>) {
    if let Some(ticker) = ticker {
        ticker.tick().await;
    }
}

async fn scan(client: AnalysisClient, args: ScanArgs) -> Result<()> {
    let profile = args.capture_profile()?;
    log::info!(
        "Profile: {} cm · {} kg · age {} · {} · {}",
        profile.height_cm,
        profile.weight_kg,
        profile.age,
        profile.gender,
        profile.activity_level
    );

    let history = HistoryLoader::new(client.clone(), &profile.user_id, args.history_limit);
    let mut timeline = HistoryTimeline::default();
    history.refresh(&mut timeline).await;

    let coordinator = CaptureCoordinator::new(client, profile, history);

    let source = ReplaySource::open(&args.landmarks)
        .with_context(|| format!("Failed to open {}", args.landmarks.display()))?;

    let policy = CapturePolicy::default();
    let mut controller = ScanController::new(policy, PoseOptions::default(), LogRenderer::new(policy));
    controller.start(source).context("Failed to start landmark source")?;

    let mut ticker = (args.fps > 0).then(|| {
        let mut ticker = interval(Duration::from_secs_f64(1.0 / args.fps as f64));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    });

    log::info!("Stand ~1.5m away · good lighting · full body visible");

    // Registered once: a Ctrl-C during a capture request is seen on the
    // next iteration instead of being lost.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while controller.is_scanning() {
        let polled = tokio::select! {
            _ = &mut ctrl_c => None,
            polled = async {
                next_tick(&mut ticker).await;
                controller.poll().await
            } => Some(polled),
        };

        let Some(polled) = polled else {
            log::info!("Stop requested");
            controller.stop();
            break;
        };

        if let Some(pending) = polled? {
            log::info!("Running analysis and saving scan...");
            match coordinator.capture(&mut controller, &mut timeline, pending).await {
                CaptureOutcome::Saved(analysis) => print!("{}", AnalysisCard(&analysis)),
                CaptureOutcome::Failed(message) => log::error!("{}", message),
                CaptureOutcome::Stale => {}
            }
        }
    }

    println!();
    println!("Scan history");
    print!("{}", timeline);

    match controller.status() {
        CaptureStatus::Failed(message) => anyhow::bail!("Scan failed: {}", message),
        CaptureStatus::Done(_) => Ok(()),
        _ => {
            log::warn!("No stable pose was held long enough to capture");
            Ok(())
        }
    }
}

async fn history(client: AnalysisClient, user_id: String, limit: u32) -> Result<()> {
    let loader = HistoryLoader::new(client, user_id, limit);
    let mut timeline = HistoryTimeline::default();
    if !loader.refresh(&mut timeline).await {
        log::warn!("Scan history unavailable");
    }
    print!("{}", timeline);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Body scan client starting...");
    log::info!("Server: {}", cli.server);

    let client = AnalysisClient::new(&cli.server, Duration::from_secs(cli.timeout_secs))
        .context("Failed to initialize client")?;

    match cli.command {
        Commands::Scan(args) => scan(client, args).await.context("Scan error"),
        Commands::History { user_id, limit } => history(client, user_id, limit).await,
    }
}
