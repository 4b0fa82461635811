use anyhow::Result;
use clap::Parser;
use treestore_engine::config::{load_snapshot, CliArgs};
use treestore_engine::server::TreeServer;
use treestore_engine::store::TreeStore;
use treestore_engine::transport::NdjsonTransport;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let limits = args.limits();
    let store = match &args.snapshot {
        Some(path) => {
            tracing::info!(snapshot = %path.display(), "Loading initial tree");
            TreeStore::with_structure(load_snapshot(path)?, limits)?
        }
        None => TreeStore::new(limits),
    };
    tracing::info!(nodes = store.metrics().node_count, "Tree ready");

    let mut server = TreeServer::new(NdjsonTransport::new(), store);

    tracing::info!("treestore-engine ready");
    server.run()?;
    Ok(())
}
