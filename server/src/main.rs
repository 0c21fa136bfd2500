use anyhow::{ensure, Result};
use axum::Router;
use clap::Parser;
use engine::bm25::Bm25Params;
use engine::{EngineConfig, SearchEngine};
use server::{build_app, loader, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "Hybrid BM25 + TF-IDF cosine passage search server", long_about = None)]
struct Args {
    /// Flat passage corpus (JSONL) produced by the ingest tool
    #[arg(long)]
    corpus: String,
    /// Cap on the number of passages loaded from the corpus file
    #[arg(long)]
    max_docs: Option<usize>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 5000)]
    port: u16,
    /// BM25 term-frequency saturation parameter
    #[arg(long, default_value_t = 1.5)]
    k1: f32,
    /// BM25 document-length normalization parameter
    #[arg(long, default_value_t = 0.75)]
    b: f32,
    /// Number of BM25 candidates reranked with cosine similarity
    #[arg(long, default_value_t = 100)]
    rerank_count: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    // Corpus load and index build both abort startup on failure; the
    // server never comes up with a partial corpus.
    let corpus = loader::load_corpus(&args.corpus, args.max_docs)?;
    ensure!(!corpus.is_empty(), "no documents loaded from {}", args.corpus);

    let config = EngineConfig {
        bm25: Bm25Params {
            k1: args.k1,
            b: args.b,
        },
        rerank_count: args.rerank_count,
    };
    let engine = SearchEngine::new(corpus, config)?;
    let state = AppState::new(Some(Arc::new(engine)));
    let app: Router = build_app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
