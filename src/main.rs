use std::path::PathBuf;

use prodsearch::catalog;
use prodsearch::cli::{Cli, Commands, ConfigAction};
use prodsearch::config::Config;
use prodsearch::embedding::TeiClient;
use prodsearch::engine::{EsClient, SearchEngine};
use prodsearch::error::{ProdsearchError, Result};
use prodsearch::ingest::CatalogLoader;
use prodsearch::search::{
    FusionWeights, QueryDispatcher, ScoredHit, SearchMode, SearchRequest,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Init => cmd_init(cli.config).await?,
        Commands::Load {
            file,
            sample: _,
            force,
            no_embeddings,
        } => cmd_load(cli.config, file, force, no_embeddings).await?,
        Commands::Query {
            text,
            mode,
            limit,
            keyword_weight,
            semantic_weight,
            json,
        } => {
            cmd_query(
                cli.config,
                &text,
                mode,
                limit,
                keyword_weight,
                semantic_weight,
                json,
            )
            .await?
        }
        Commands::Config { action } => cmd_config(cli.config, action)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose {
        "prodsearch=debug"
    } else {
        "prodsearch=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt().with_env_filter(filter).with_target(false).init();
}

async fn cmd_init(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let es = EsClient::new(&config.engine, &config.retry)?;

    if es.index_exists().await? {
        println!("Index '{}' already exists", es.index());
        return Ok(());
    }

    es.create_index(config.embedding.dimension).await?;
    println!(
        "✓ Created index '{}' ({} dims, cosine)",
        es.index(),
        config.embedding.dimension
    );
    Ok(())
}

async fn cmd_load(
    config_path: Option<PathBuf>,
    file: Option<PathBuf>,
    force: bool,
    no_embeddings: bool,
) -> Result<()> {
    let config = load_config(config_path)?;

    let products = match &file {
        Some(path) => catalog::load_catalog(path)?,
        None => catalog::sample_catalog()?,
    };

    let es = EsClient::new(&config.engine, &config.retry)?;
    if !es.index_exists().await? {
        es.create_index(config.embedding.dimension).await?;
        tracing::info!("created index '{}'", es.index());
    }

    if !force {
        let count = es.count().await?;
        if count > 0 {
            println!(
                "Index '{}' already has {} docs; use --force to reindex",
                es.index(),
                count
            );
            return Ok(());
        }
    }

    let embedder = if no_embeddings || !config.embedding.enabled {
        tracing::warn!("embeddings disabled; indexing zero vectors");
        None
    } else {
        Some(TeiClient::new(&config.embedding, &config.retry)?)
    };

    let loader = CatalogLoader::new(
        &es,
        embedder.as_ref(),
        config.embedding.dimension,
        config.ingest.failure_threshold,
    );

    let report = loader.load(&products).await?;

    println!(
        "✓ Indexed {} of {} products into '{}'",
        report.indexed,
        report.total(),
        es.index()
    );
    for skipped in &report.skipped {
        println!("  - {}: {}", skipped.id, skipped.reason);
    }
    for failure in &report.failures {
        println!("  ✗ {}: {}", failure.id, failure.reason);
    }

    Ok(())
}

async fn cmd_query(
    config_path: Option<PathBuf>,
    text: &str,
    mode: SearchMode,
    limit: Option<usize>,
    keyword_weight: Option<f32>,
    semantic_weight: Option<f32>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;

    let weights = FusionWeights::new(
        keyword_weight.unwrap_or(config.query.keyword_weight),
        semantic_weight.unwrap_or(config.query.semantic_weight),
    )?;

    let request = SearchRequest {
        text: text.to_string(),
        mode,
        limit: limit.unwrap_or(config.query.default_limit),
        weights,
    };

    let es = EsClient::new(&config.engine, &config.retry)?;
    let tei = TeiClient::new(&config.embedding, &config.retry)?;
    let dispatcher = QueryDispatcher::new(&es, &tei);

    let hits = dispatcher.search(&request).await?;

    if json {
        let out = serde_json::to_string_pretty(&hits).map_err(|e| ProdsearchError::Json {
            source: e,
            context: "Failed to serialize results".to_string(),
        })?;
        println!("{}", out);
    } else {
        print_results(&format!("{:?} Search: \"{}\"", mode, text), &hits);
    }

    Ok(())
}

fn print_results(title: &str, hits: &[ScoredHit]) {
    println!("\n{}", title);
    println!("{}", "-".repeat(title.len()));

    if hits.is_empty() {
        println!("(no results)");
        return;
    }

    for (i, hit) in hits.iter().enumerate() {
        let name = hit.source["name"].as_str().unwrap_or(&hit.id);
        let brand = hit.source["brand"].as_str().unwrap_or("?");
        let price = hit.source["price"].as_f64().unwrap_or(0.0);
        println!(
            "{:>2}. [{:.4}] {}  —  {}  (${})",
            i + 1,
            hit.score,
            name,
            brand,
            price
        );
    }
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| ProdsearchError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ProdsearchError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            let config = Config::default();
            config.save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
        ConfigAction::Validate { file } => {
            let path = match file {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'prodsearch config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        return Ok(config);
    }

    Config::load(&path)
}
