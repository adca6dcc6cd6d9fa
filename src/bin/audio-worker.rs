use std::{path::PathBuf, process, sync::Arc};

use audio_worker::{
    build_router, logging::init_logging, model::registry::layouts, AppState, JobDescription,
    JobDispatcher, ProcessingEngine, ResultEnvelope, SeparationBackendKind, WorkerConfig,
};
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "audio-worker")]
#[command(about = "Audio job worker: trim clips and split tracks into stems", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// TOML config file
    #[arg(short, long, global = true, env = "AUDIO_WORKER_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Separation backend: "command" or "fixture"
    #[arg(long, global = true)]
    backend: Option<String>,

    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP worker
    Serve {
        #[arg(short, long)]
        bind: Option<String>,
    },

    Trim {
        #[arg(short, long)]
        input: String,

        #[arg(short, long, default_value_t = 0.0)]
        start: f64,

        #[arg(short, long, default_value_t = 10.0)]
        end: f64,
    },

    Separate {
        #[arg(short, long)]
        input: String,

        #[arg(short, long, default_value_t = 4)]
        stems: u32,
    },

    /// List supported stem layouts
    Layouts,
}

fn load_config(common: &CommonArgs) -> anyhow::Result<WorkerConfig> {
    let mut cfg = WorkerConfig::load(common.config.as_deref())?;
    if let Some(dir) = &common.output_dir {
        cfg.output_dir = dir.clone();
    }
    if let Some(backend) = &common.backend {
        cfg.separation.backend = backend.parse::<SeparationBackendKind>()?;
    }
    Ok(cfg)
}

fn dispatcher(cfg: &WorkerConfig) -> anyhow::Result<JobDispatcher> {
    let engine = ProcessingEngine::from_config(cfg)?;
    Ok(JobDispatcher::new(Arc::new(engine)))
}

fn print_envelope(envelope: &ResultEnvelope) -> anyhow::Result<bool> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(envelope.is_completed())
}

async fn handle_serve(cfg: WorkerConfig, bind: Option<String>) -> anyhow::Result<bool> {
    let bind = bind.unwrap_or_else(|| cfg.bind_addr.clone());
    let state = AppState::new(dispatcher(&cfg)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Listening on http://{bind}");
    info!("Health check: http://{bind}/health");

    axum::serve(listener, app).await?;
    Ok(true)
}

fn handle_layouts() -> bool {
    for layout in layouts() {
        println!("{:>2}  {}", layout.count, layout.stems.join(", "));
    }
    true
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let cfg = load_config(&cli.common)?;

    match cli.command {
        Commands::Serve { bind } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(handle_serve(cfg, bind))
        }
        Commands::Trim { input, start, end } => {
            let job = JobDescription::new(input, "trim")
                .with_param("start", start)
                .with_param("end", end);
            print_envelope(&dispatcher(&cfg)?.submit_blocking(job))
        }
        Commands::Separate { input, stems } => {
            let job = JobDescription::new(input, "separate").with_param("stemCount", stems);
            print_envelope(&dispatcher(&cfg)?.submit_blocking(job))
        }
        Commands::Layouts => Ok(handle_layouts()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.common.log_level);

    match run(cli) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
