use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::sync::Arc;
use teller::application::session::Teller;
use teller::domain::ports::CardRegistryRef;
use teller::infrastructure::in_memory::InMemoryCardRegistry;
use teller::interfaces::console::Console;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Issuer identification number prefixed to every card.
    #[arg(long, default_value = "400000")]
    issuer_prefix: String,

    /// Default log filter when RUST_LOG is not set.
    #[arg(long, default_value = "teller=info")]
    log_level: String,
}

#[cfg(feature = "storage-rocksdb")]
fn open_persistent(path: PathBuf) -> Result<CardRegistryRef> {
    use teller::infrastructure::rocksdb::RocksDbCardRegistry;
    let registry = RocksDbCardRegistry::open(path).into_diagnostic()?;
    Ok(Arc::new(registry))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_persistent(_path: PathBuf) -> Result<CardRegistryRef> {
    Err(miette::miette!(
        "persistent storage requires building with --features storage-rocksdb"
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    teller::logging::init(&cli.log_level);

    let registry: CardRegistryRef = match cli.db_path {
        Some(path) => open_persistent(path)?,
        None => Arc::new(InMemoryCardRegistry::new()),
    };

    let teller = Teller::new(registry, cli.issuer_prefix);
    Console::new(teller).run().await.into_diagnostic()?;

    Ok(())
}
