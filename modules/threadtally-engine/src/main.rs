use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use authority_client::LlmAuthority;
use threadtally_common::Config;
use threadtally_engine::pipeline;
use threadtally_engine::source::{FixtureSource, ThreadSource};
use threadtally_engine::{Corpus, JsonLedger, PipelineOptions, ValidationLedger};

/// Tally entity mentions across a reply thread.
#[derive(Parser)]
#[command(name = "threadtally")]
struct Args {
    /// JSON file holding the thread's posts (array of Post records)
    fixture: PathBuf,

    /// Root post uri, when the fixture doesn't flag one
    #[arg(long)]
    root_uri: Option<String>,

    /// How many ranked mentions to print
    #[arg(long, default_value_t = 20)]
    top: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("threadtally=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let source = FixtureSource::new(&args.fixture);
    let mut posts = source
        .fetch_thread(args.root_uri.as_deref().unwrap_or(""))
        .await?;
    info!(posts = posts.len(), fixture = %args.fixture.display(), "thread loaded");

    if let Some(root_uri) = &args.root_uri {
        for post in &mut posts {
            if &post.uri == root_uri {
                post.is_root = true;
            }
        }
    }

    let corpus = Corpus::from_posts(posts)?;

    let store = Arc::new(JsonLedger::new(&config.ledger_path));
    let ledger = ValidationLedger::load(store).await?;
    info!(
        entries = ledger.len().await,
        path = config.ledger_path.as_str(),
        "validation ledger loaded"
    );

    let authority = LlmAuthority::new(&config.anthropic_api_key, &config.authority_model);
    let options = PipelineOptions {
        validation_concurrency: config.validation_concurrency,
    };

    let report = pipeline::run(&corpus, &ledger, &authority, &options).await?;

    println!("{}", report.stats);
    println!("Top mentions:");
    for mention in report.mentions.iter().take(args.top) {
        println!("  {:>4}  {}", mention.count, mention.mention);
    }
    if !report.uncategorized.is_empty() {
        println!("\nUncategorized posts: {}", report.uncategorized.len());
    }

    Ok(())
}
