use anyhow::Result;
use clap::{Parser, Subcommand};
use krug_loader::{load_site_data, LoaderConfig};
use krug_storage::DocumentStore;
use krug_sync::{
    sort_organizers_file, ContributorSync, SortOutcome, SyncConfig, ORGANIZERS_FILE,
};

#[derive(Debug, Parser)]
#[command(name = "krug-cli")]
#[command(about = "Data tooling for the Airflow KRUG community site")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load all five site documents and print a summary.
    Load {
        /// Base URL the YAML documents are served from.
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Refresh contributor records from the GitHub search API.
    SyncContributors,
    /// Re-sort and re-number the organizers document.
    SortOrganizers,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Load { base_url: None }) {
        Commands::Load { base_url } => {
            let mut config = LoaderConfig::from_env();
            if let Some(base_url) = base_url {
                config.base_url = base_url;
            }
            let source = config.document_source()?;
            let data = load_site_data(&source).await?;
            println!(
                "site data loaded: upcoming_events={} past_events={} organizers={} contributors={} channels={}",
                data.events.upcoming.len(),
                data.events.past.len(),
                data.organizers.len(),
                data.contributors.len(),
                data.channels.len()
            );
        }
        Commands::SyncContributors => {
            let sync = ContributorSync::new(SyncConfig::from_env())?;
            let summary = sync.run_once().await?;
            println!(
                "contributors updated: run_id={} approved={} refreshed={} skipped={}",
                summary.run_id, summary.approved, summary.refreshed, summary.skipped
            );
        }
        Commands::SortOrganizers => {
            let config = SyncConfig::from_env();
            let store = DocumentStore::new(&config.data_dir);
            match sort_organizers_file(&store, ORGANIZERS_FILE)? {
                SortOutcome::NoOrganizersSection => {
                    println!("No organizers section found in the YAML file");
                }
                SortOutcome::Sorted { generations, .. } => {
                    println!("organizers.yaml has been sorted successfully");
                    for group in generations {
                        println!(
                            "- {}: {} organizers sorted by name and re-numbered",
                            group.key, group.members
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).with_target(false).init();
}
