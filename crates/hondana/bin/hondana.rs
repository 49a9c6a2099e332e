#[macro_use]
extern crate log;

use clap::Parser;
use hondana::{
    application::context::AppContext,
    domain::repositories::storage::StorageRepository,
    infrastructure::{
        config::Config,
        repositories::{
            catalog::HttpCatalogRepository,
            storage::{FileStorageRepository, MemoryStorageRepository},
        },
    },
    presentation::cli::{self, Command, Opts},
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var("RUST_LOG").is_err() {
        if let Ok(hondana_log) = std::env::var("HONDANA_LOG") {
            logger.parse_filters(&format!(
                "hondana={},hondana_lib={}",
                hondana_log, hondana_log
            ));
        }
    }
    logger.init();

    let opts: Opts = Opts::parse();
    let config = Config::open(opts.config.as_ref())?;

    debug!("hondana-lib {}", hondana_lib::LIB_VERSION);
    debug!("config: {:?}", config);

    if opts.ephemeral {
        run(config, MemoryStorageRepository::new(), opts.command).await
    } else {
        let storage = FileStorageRepository::new(&config.data_path)?;
        run(config, storage, opts.command).await
    }
}

async fn run<S>(config: Config, storage: S, command: Command) -> Result<(), anyhow::Error>
where
    S: StorageRepository,
{
    let catalog = HttpCatalogRepository::new(&config.api_url, &config.cover_placeholder)?;
    let mut ctx = AppContext::new(config, catalog, storage);

    let mut stdout = std::io::stdout().lock();
    cli::execute(&mut ctx, command, &mut stdout).await
}
