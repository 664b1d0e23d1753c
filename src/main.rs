mod extract;
mod listing;
mod report;
mod sorn;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use sorn::{Field, Sorn};

#[derive(Parser)]
#[command(name = "sorn_scraper", about = "GSA SORN scraper for Federal Register notices")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the listing page and print the discovered notice URLs
    Discover,
    /// Discover, fetch, and extract every notice, then write the summary CSV
    Run {
        /// Max notices to fetch (default: all discovered)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Summary CSV path (overwritten each run)
        #[arg(short, long, default_value = "gsa_sorns.csv")]
        output: PathBuf,
        /// Fields to extract per notice
        #[arg(
            long,
            value_enum,
            value_delimiter = ',',
            default_values_t = sorn::DEFAULT_FIELDS.to_vec()
        )]
        fields: Vec<Field>,
        /// Also append one detail row per notice to this file
        #[arg(long)]
        details: Option<PathBuf>,
    },
    /// Fetch a single notice and print its extracted fields
    Inspect {
        /// Notice URL on the Federal Register
        url: String,
        /// Fields to extract (default: all)
        #[arg(long, value_enum, value_delimiter = ',')]
        fields: Option<Vec<Field>>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let result = match cli.command {
        Commands::Discover => {
            let sorns = listing::discover(&client).await?;
            for sorn in &sorns {
                println!("{}", sorn.html_url);
            }
            println!("\n{} notices found", sorns.len());
            Ok(())
        }
        Commands::Run {
            limit,
            output,
            fields,
            details,
        } => {
            let mut sorns = listing::discover(&client).await?;
            if let Some(n) = limit {
                sorns.truncate(n);
            }
            if sorns.is_empty() {
                println!("No notice links found on the listing page.");
                return Ok(());
            }

            println!("Fetching {} notices...", sorns.len());
            let stats = listing::fetch_all(&client, &mut sorns, &fields).await;
            println!(
                "Done: {} fetched ({} ok, {} errors).",
                stats.total, stats.ok, stats.errors
            );

            report::write_summary(&output, &sorns)?;
            println!("Wrote {} rows to {}", sorns.len(), output.display());

            if let Some(path) = details {
                for sorn in &sorns {
                    report::append_detail(&path, sorn)?;
                }
                println!("Appended {} detail rows to {}", sorns.len(), path.display());
            }
            Ok(())
        }
        Commands::Inspect { url, fields } => {
            let fields = fields.unwrap_or_else(|| Field::value_variants().to_vec());
            let mut sorn = Sorn::new(url);
            println!("Document URL: {}", sorn.xml_url);
            sorn.extract_all(&client, &fields).await;
            for &field in &fields {
                match sorn.get(field) {
                    Some(text) => println!("\n[{field}]\n{text}"),
                    None => println!("\n[{field}]\n(not found)"),
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}
