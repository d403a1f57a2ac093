//! Build a pilot dataset by sampling posts from source JSONL corpora.
//!
//! ```text
//! claimdesk-pilot \
//!     --source kantipur=data/kantipur.jsonl:data/kantipur_images \
//!     --source setopati=data/setopati.jsonl:data/setopati_images \
//!     --per-source 25 --output pilot_data_new
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claimdesk_core::pilot::{PilotSource, DEFAULT_SAMPLES_PER_SOURCE};
use claimdesk_store::pilot::build_pilot_dataset;

#[derive(Parser)]
#[command(name = "claimdesk-pilot")]
#[command(version, about = "Sample a pilot annotation dataset from source corpora")]
struct Cli {
    /// Source as `name=path/to/posts.jsonl:path/to/images`. Repeatable.
    #[arg(long = "source", required = true)]
    sources: Vec<String>,

    /// Posts sampled from each source.
    #[arg(long, default_value_t = DEFAULT_SAMPLES_PER_SOURCE)]
    per_source: usize,

    /// Output directory for `pilot_data.json` and `images/`.
    #[arg(long, default_value = "pilot_data_new")]
    output: PathBuf,

    /// Seed for reproducible samples.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claimdesk_store=info,claimdesk_pilot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let sources = cli
        .sources
        .iter()
        .map(|s| PilotSource::parse(s).with_context(|| format!("invalid --source '{s}'")))
        .collect::<Result<Vec<_>>>()?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let summary = build_pilot_dataset(&sources, cli.per_source, &cli.output, &mut rng)
        .await
        .with_context(|| format!("failed to build pilot dataset in {}", cli.output.display()))?;

    tracing::info!(
        total = summary.total,
        missing_images = summary.missing_images,
        dataset = %summary.dataset_path.display(),
        images = %summary.images_dir.display(),
        "Pilot dataset created"
    );
    Ok(())
}
