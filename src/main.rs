//! Lector - 文本转语音 CLI
//!
//! `lector -l fr "bonjour"` 合成（或缓存命中）音频并并发执行
//! 播放 / 上传 / 记录；`lector serve` 以 HTTP 服务方式提供同一条流水线。

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use lector::application::{Pipeline, PipelineOptions, SideEffects, SynthesisOutcome};
use lector::config::{
    load_config, load_config_from_path, print_config, AppConfig, LangRegistry,
};
use lector::domain::SpeechRequest;
use lector::infrastructure::adapters::{
    AzureSynthesizer, AzureSynthesizerConfig, HttpRecordAppender, PlayerPlayback, RcloneUploader,
};
use lector::infrastructure::http::{AppState, HttpServer};

const MAX_CONTENT_PREVIEW: usize = 42;

#[derive(Debug, Parser)]
#[command(
    name = "lector",
    version,
    about = "Cached text-to-speech reader",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Language (short name from the registry, e.g. fr, pl, jp, en)
    #[arg(short, long, default_value = "fr")]
    language: String,

    /// Speech rate multiplier (defaults to 0.8)
    #[arg(short, long)]
    speed: Option<f64>,

    /// Re-synthesize even when a valid cached artifact exists
    #[arg(short = 'f', long)]
    overwrite: bool,

    /// Only play locally; skip upload and record append
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to a config file (overrides the default search)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text to read aloud
    content: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run as an HTTP service exposing the same pipeline
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = match &cli.config {
        Some(path) => load_config_from_path(Some(path))?,
        None => load_config()?,
    };

    // 初始化日志；-v 压过配置的级别
    let level = if cli.verbose {
        "debug"
    } else {
        config.log.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("lector={}", level))),
        )
        .init();

    if cli.verbose {
        print_config(&config);
    }

    match &cli.command {
        Some(Command::Serve) => serve(config).await,
        None => speak(cli, config).await,
    }
}

/// CLI 单次运行
async fn speak(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let content = cli
        .content
        .ok_or_else(|| anyhow::anyhow!("Content argument missing"))?;

    let registry = LangRegistry::new(config.langs.clone());
    let profile = registry.resolve(&cli.language)?;

    // 内容与语言正则不匹配不阻断，只提醒
    match registry.content_matches(&cli.language, &content) {
        Ok(true) => {}
        Ok(false) => tracing::warn!(
            language = %cli.language,
            "Content does not look like the selected language"
        ),
        Err(err) => tracing::warn!(error = %err, "Content pattern check skipped"),
    }

    let request = SpeechRequest::build(
        content,
        profile,
        cli.speed,
        &config.storage.audio_dir,
    )?;

    tracing::info!(
        "{} [{}][{}]",
        profile.flag,
        request.content_preview(MAX_CONTENT_PREVIEW),
        request.content().len()
    );
    tracing::info!("📂 {}", home_relative(request.dest_path()));

    let pipeline = build_pipeline(&config, cli.overwrite, cli.dry_run)?;
    let report = pipeline.run(request).await?;

    tracing::info!(
        cache_hit = matches!(report.outcome, SynthesisOutcome::CacheHit { .. }),
        tasks = report.tasks.len(),
        "✅ done"
    );
    Ok(())
}

/// serve 模式：同一条流水线挂到 HTTP 上
async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let registry = LangRegistry::new(config.langs.clone());
    let pipeline = Arc::new(build_pipeline(&config, false, false)?);

    let state = AppState::new(
        pipeline,
        registry,
        config.storage.audio_dir.clone(),
        "fr".to_string(),
    );

    let server = HttpServer::new(config.server.clone(), state);
    server
        .run_with_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 从配置组装流水线
fn build_pipeline(config: &AppConfig, overwrite: bool, dry_run: bool) -> anyhow::Result<Pipeline> {
    let synthesizer = Arc::new(AzureSynthesizer::new(AzureSynthesizerConfig {
        endpoint: config.tts.endpoint.clone(),
        api_key: config.tts.api_key.clone(),
        output_format: config.tts.output_format.clone(),
        timeout_secs: config.tts.timeout_secs,
    })?);

    let side_effects = SideEffects {
        playback: Arc::new(PlayerPlayback::new(
            config.playback.clone(),
            config.storage.min_artifact_bytes,
        )),
        upload: Arc::new(RcloneUploader::new(config.upload.clone())),
        records: Arc::new(HttpRecordAppender::new(config.records.clone())?),
    };

    let options = PipelineOptions {
        overwrite,
        dry_run,
        synthesis_retry: config.tts.retry,
        task_retry: config.tasks.retry,
        task_timeout: config.tasks.timeout(),
        min_artifact_bytes: config.storage.min_artifact_bytes,
    };

    Ok(Pipeline::new(synthesizer, side_effects, options))
}

/// 家目录下的路径以 ~ 显示（仅日志展示用）
fn home_relative(path: &std::path::Path) -> String {
    let display = path.display().to_string();
    if let Some(home) = std::env::var_os("HOME") {
        let home = home.to_string_lossy();
        if let Some(rest) = display.strip_prefix(home.as_ref()) {
            return format!("~{}", rest);
        }
    }
    display
}
