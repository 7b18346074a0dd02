//! Recall HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use recall::config::Config;
use recall::embedding::{Embedder, HttpEmbedder, StubEmbedder};
use recall::gateway::{AppState, create_router_with_state};
use recall::ingest::Ingestor;
use recall::llm::{GenaiBackend, GenerationBackend};
use recall::pipeline::RagPipeline;
use recall::prompt::PromptBuilder;
use recall::ranking::build_ranker;
use recall::retrieval::SemanticRetriever;
use recall::vectordb::{QdrantStore, VectorStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const LLM_TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;
    let policy = config.answer_policy()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        model = %config.llm_model,
        ranker = %config.ranker,
        min_relevance_score = policy.min_relevance_score(),
        extractive_score_threshold = policy.extractive_score_threshold(),
        "Recall starting"
    );

    let embedder: Arc<dyn Embedder> = match &config.embedding_url {
        Some(url) => {
            let mut http = HttpEmbedder::new(
                url.clone(),
                config.embedding_model.clone(),
                config.embedding_dim,
            )?;
            if let Some(key) = &config.embedding_api_key {
                http = http.with_api_key(key.clone());
            }
            Arc::new(http)
        }
        None => {
            tracing::warn!("No RECALL_EMBEDDING_URL configured, running embedder in stub mode");
            Arc::new(StubEmbedder::new(config.embedding_dim))
        }
    };

    let store = Arc::new(QdrantStore::new(&config.qdrant_url)?);
    if let Err(e) = store
        .ensure_collection(&config.collection, config.embedding_dim as u64)
        .await
    {
        tracing::warn!(error = %e, "Vector store unavailable at startup; queries will return no results until it recovers");
    }

    let backend: Arc<dyn GenerationBackend> =
        Arc::new(GenaiBackend::new(config.llm_model.clone()).with_timeout(LLM_TIMEOUT));

    let prompt_builder = match &config.prompts_dir {
        Some(dir) => PromptBuilder::from_dir(config.prompt_mode, dir)?,
        None => PromptBuilder::new(config.prompt_mode),
    }
    .with_max_chars(config.prompt_max_chars);

    let ranker = build_ranker(config.ranker, backend.clone(), config.judge_settings());

    let retriever = SemanticRetriever::new(store.clone(), embedder.clone(), config.collection.clone());
    let pipeline = RagPipeline::new(Arc::new(retriever), backend, prompt_builder, policy)
        .with_optional_ranker(ranker);

    let ingestor = Ingestor::new(store, embedder.clone(), config.collection.clone())
        .with_chunking(config.chunk_size, config.chunk_overlap);

    let state = AppState::new(Arc::new(pipeline), Arc::new(ingestor), embedder);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Recall shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("RECALL_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
