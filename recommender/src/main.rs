use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use engine::catalog::{DEFAULT_SAMPLE_SEED, DEFAULT_SAMPLE_SIZE};
use engine::{build_index, load_catalog, recommend, sample_entries, FilterCriteria, IndexHandle, Recommendation};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "recommender")]
#[command(about = "Recommend hotel packages from a travel-offer catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CatalogArg {
    /// Catalog file (.csv, .json or .jsonl)
    #[arg(long)]
    catalog: String,
    /// Maximum rows to index, drawn by a seeded sample (0 = all rows)
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample: usize,
    /// Seed for the row sample
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SEED)]
    seed: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank packages matching the given filter
    Recommend {
        #[command(flatten)]
        catalog: CatalogArg,
        #[arg(long)]
        package_type: String,
        #[arg(long)]
        start_city: String,
        #[arg(long)]
        destination: String,
        #[arg(long, default_value_t = 10_000.0)]
        max_price: f64,
        /// Return at most this many results
        #[arg(long)]
        limit: Option<usize>,
        /// Print results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the values available for each filter
    Facets {
        #[command(flatten)]
        catalog: CatalogArg,
    },
    /// Print index statistics
    Stats {
        #[command(flatten)]
        catalog: CatalogArg,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend { catalog, package_type, start_city, destination, max_price, limit, json } => {
            let index = open_index(&catalog)?;
            let criteria = FilterCriteria { package_type, start_city, destination, max_price };
            print_recommendation(&recommend(&index, &criteria, limit), json)
        }
        Commands::Facets { catalog } => {
            let index = open_index(&catalog)?;
            println!("{}", serde_json::to_string_pretty(&index.facets())?);
            Ok(())
        }
        Commands::Stats { catalog } => {
            let start = Instant::now();
            let index = open_index(&catalog)?;
            println!("entries:    {}", index.entries().len());
            println!("terms:      {}", index.vocabulary().len());
            println!("nonzeros:   {}", index.weights().nnz());
            println!("build time: {:.3}s", start.elapsed().as_secs_f64());
            Ok(())
        }
    }
}

fn open_index(arg: &CatalogArg) -> Result<IndexHandle> {
    let entries = sample_entries(load_catalog(&arg.catalog)?, arg.sample, arg.seed);
    Ok(build_index(entries)?)
}

/// Same shape as the server's response, so NoMatch never looks like an empty ranking.
fn recommendation_json(rec: &Recommendation) -> serde_json::Value {
    match rec {
        Recommendation::NoMatch => serde_json::json!({ "matched": false, "total_hits": 0, "results": [] }),
        Recommendation::Ranked(r) => serde_json::json!({ "matched": true, "total_hits": r.matched, "results": r.hotels }),
    }
}

fn print_recommendation(rec: &Recommendation, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&recommendation_json(rec))?);
        return Ok(());
    }
    match rec {
        Recommendation::NoMatch => println!("No matching hotels found."),
        Recommendation::Ranked(r) => {
            for h in &r.hotels {
                println!("{:.6}\t{}\t{}", h.score, h.id, h.hotel_details);
            }
        }
    }
    Ok(())
}
