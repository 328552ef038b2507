use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use budgetree::cli::{handle_tree_command, TreeCommands};
use budgetree::config::{paths::BudgetreePaths, settings::Settings};
use budgetree::storage::Store;

#[derive(Parser)]
#[command(
    name = "budgetree",
    version,
    about = "Hierarchical budget tree manager",
    long_about = "budgetree maintains nested budget line items under categories, \
                  each with a unique hierarchical code, target amounts, and \
                  realized-transaction aggregates. Trees are edited as drafts \
                  and saved atomically."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Tree(TreeCommands),

    /// Initialize the data directory and database
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = BudgetreePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Commands::Init => {
            paths.ensure_directories()?;
            let database = settings.database_file(&paths);
            Store::open(&database)?;
            println!("Initialized budgetree at {}", paths.base_dir().display());
            println!("Database: {}", database.display());
        }
        Commands::Config => {
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!(
                "Database:       {}",
                settings.database_file(&paths).display()
            );
        }
        Commands::Tree(cmd) => {
            let mut store = Store::open(settings.database_file(&paths))?;
            handle_tree_command(&mut store, &settings, cmd)?;
        }
    }

    Ok(())
}
