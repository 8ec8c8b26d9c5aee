use anyhow::Context;
use auction_ledger::{
    api, config::Config, db::init_db, ContractStateReader, GatewayMetadataResolver, Ingestor,
    MetadataResolver, Projector, Repository, RpcStateReader,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let pool = init_db(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    let repo = Repository::new(pool);

    let reader: Arc<dyn ContractStateReader> = Arc::new(RpcStateReader::new(config.rpc_url.clone()));
    let metadata: Arc<dyn MetadataResolver> = Arc::new(GatewayMetadataResolver::new(
        config.metadata_gateway_url.clone(),
    ));
    let projector = Projector::new(
        config.chain.clone(),
        reader,
        metadata,
        repo.clone(),
        config.submitted_price,
    );
    let ingestor = Ingestor::open(projector, repo.clone())
        .await
        .context("Failed to load ingestion cursor")?;

    let app = api::create_router(api::AppState::new(Arc::new(repo), ingestor));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(chain = %config.chain, "Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
