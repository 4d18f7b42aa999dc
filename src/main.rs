use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mixclust::{Session, SnapshotStore, TableSource};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt};

/// k-means clustering over tables with mixed discrete and continuous columns
#[derive(Parser)]
#[command(name = "mixclust")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding saved snapshots
    #[arg(long, default_value = "snapshots", global = true)]
    snapshots: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster a database table
    Run {
        /// SQLite database file
        #[arg(long)]
        db: String,
        /// Table to cluster
        #[arg(long)]
        table: String,
        /// Number of clusters
        #[arg(short)]
        k: usize,
        /// Fixed seed for centroid sampling
        #[arg(long)]
        seed: Option<u64>,
        /// Save the resulting model as <table><k>
        #[arg(long)]
        save: bool,
    },
    /// Print a saved model
    Show {
        /// Table the model was built from
        #[arg(long)]
        table: String,
        /// Number of clusters of the model
        #[arg(short)]
        k: usize,
    },
    /// List saved models
    List,
    /// List the tables of a database
    Tables {
        /// SQLite database file
        #[arg(long)]
        db: String,
    },
}

/// Filter directives for the log subscriber; RUST_LOG, when set, wins over -v
fn log_directives(verbose: u8, env: Option<String>) -> String {
    if let Some(env) = env.filter(|e| !e.trim().is_empty()) {
        return env;
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
    .to_string()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let directives = log_directives(cli.verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let store = SnapshotStore::new(&cli.snapshots);

    match cli.command {
        Commands::Run {
            db,
            table,
            k,
            seed,
            save,
        } => run(&store, &db, &table, k, seed, save),
        Commands::Show { table, k } => show(&store, &table, k),
        Commands::List => {
            let names = store.list().context("Failed to list snapshots")?;
            if names.is_empty() {
                println!("No snapshots in {}", store.dir().display());
            }
            for name in names {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Tables { db } => {
            let source = TableSource::open(&db)?;
            for name in source.table_names()? {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

fn run(
    store: &SnapshotStore,
    db: &str,
    table: &str,
    k: usize,
    seed: Option<u64>,
    save: bool,
) -> Result<()> {
    let start = Instant::now();
    let mut session = match seed {
        Some(seed) => Session::new().with_seed(seed),
        None => Session::new(),
    };

    println!("Step 1: Loading table {}...", table);
    let source = TableSource::open(db)?;
    let rows = source.load_table(table)?;
    println!(
        "✓ {} distinct rows, attributes: {}\n",
        rows.len(),
        rows.attribute_names().join(", ")
    );
    session.attach_table(rows);

    println!("Step 2: Running k-means with k={}...", k);
    let summary = session.run(k)?;
    println!("✓ Converged in {} iterations\n", summary.passes);
    println!("{}", summary.report);

    if save {
        println!("Step 3: Saving model...");
        let path = session.save(store)?;
        println!("✓ Saved {}\n", path.display());
    }

    println!("Total execution: {:.3}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn show(store: &SnapshotStore, table: &str, k: usize) -> Result<()> {
    let mut session = Session::new();
    let summary = session
        .restore(store, table, k)
        .context(format!("Failed to restore model for {} (k = {})", table, k))?;

    println!("Attributes: {}", session.attribute_names()?.join(", "));
    println!("{}", summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directives() {
        assert_eq!(log_directives(0, None), "warn");
        assert_eq!(log_directives(2, None), "debug");
        assert_eq!(log_directives(7, None), "trace");
        assert_eq!(log_directives(0, Some(String::new())), "warn");
        assert_eq!(
            log_directives(1, Some("mixclust=trace".to_string())),
            "mixclust=trace"
        );
    }
}
