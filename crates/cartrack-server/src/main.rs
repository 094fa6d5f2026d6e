use cartrack_server::{ServerConfig, ServerError, Service};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "cartrack", version, about = "Carton delivery tracking server")]
struct Cli {
    /// TOML config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind.
    #[arg(long)]
    bind: Option<String>,

    /// Directory holding the settings, vehicles and cartons tables.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory of static files for the browser client.
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn resolve(self) -> Result<ServerConfig, ServerError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(dir) = self.data_dir {
            config.store.data_dir = dir;
        }
        if let Some(dir) = self.public_dir {
            config.public_dir = dir;
        }
        if self.log_file.is_some() {
            config.log_file = self.log_file;
        }
        Ok(config)
    }
}

fn init_tracing(log_file: Option<&Path>) -> std::io::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

fn run(config: &ServerConfig) -> Result<(), ServerError> {
    let service = Service::from_config(config);
    for table in service.engine().bootstrap()? {
        info!(
            "created {table} table at {}",
            config.store.table_path(table).display()
        );
    }
    if !config.public_dir.is_dir() {
        warn!(
            "public directory {} not found, only the API is served",
            config.public_dir.display()
        );
    }

    let server = Arc::new(cartrack_server::bind(&config.listen_addr())?);
    let port = server.server_addr().to_ip().map_or(config.port, |a| a.port());
    cartrack_server::banner::log_banner(config, port);

    let srv = Arc::clone(&server);
    if let Err(e) = ctrlc::set_handler(move || {
        info!("shutdown requested");
        srv.unblock();
    }) {
        warn!("could not install signal handler: {e}");
    }

    cartrack_server::run_server(&service, &server);
    Ok(())
}

fn main() -> ExitCode {
    let config = match Cli::parse().resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(config.log_file.as_deref()) {
        eprintln!("error: cannot open log file: {e}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
