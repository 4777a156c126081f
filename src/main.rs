use anyhow::Result;
use clap::Parser;
use livestt::{
    create_router, AppState, BroadcastHub, Config, Enricher, FfmpegDecoder, LlmClient,
    LlmTranslator, Pipeline, RemoteWhisperEngine, SegmentTranscriber, SessionConfig,
    SessionController, Summarizer, YtDlpResolver,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "livestt")]
#[command(about = "Live speech-to-text relay with multi-viewer broadcast")]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/livestt")]
    config: String,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Transcription engine: {} ({})", cfg.engine.base_url, cfg.engine.model);
    info!("Language model: {} ({})", cfg.llm.base_url, cfg.llm.model);
    info!("Primary language: {}", cfg.language.primary);

    let primary = cfg.language.primary.clone();
    let llm = LlmClient::new(&cfg.llm);
    let engine = Arc::new(RemoteWhisperEngine::new(&cfg.engine)?);
    let translator = Arc::new(LlmTranslator::new(llm.clone(), cfg.llm.translate_timeout()));

    let pipeline = Arc::new(Pipeline {
        resolver: Arc::new(YtDlpResolver::new(&cfg.resolver)),
        decoder: Arc::new(FfmpegDecoder::new(&cfg.decoder)),
        transcriber: SegmentTranscriber::new(engine, primary.clone()),
        enricher: Enricher::new(translator, primary),
        hub: BroadcastHub::new(cfg.hub.replay_capacity),
        config: SessionConfig::from(&cfg),
    });

    let controller = Arc::new(SessionController::new(pipeline));
    let state = AppState::new(
        controller,
        Summarizer::new(llm, cfg.llm.summary_timeout()),
        cfg.audio.scratch_dir(),
        cfg.audio.max_message_bytes,
    );
    let app = create_router(state, cfg.service.static_dir.as_deref());

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
