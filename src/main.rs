use rainfall_risk::config::Config;
use rainfall_risk::dashboard::DashboardView;
use rainfall_risk::loader::{CachedLoader, Dataset};
use rainfall_risk::render;
use rainfall_risk::selection::{Command, FilterSelection, HELP};
use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the dashboard.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rainfall_risk=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Rainfall risk dashboard starting...");

    // Config path can be overridden for deployments outside the repo root
    let config_path =
        std::env::var("RAINFALL_RISK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = Config::load(&config_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load configuration: {}\n\n\
             Make sure:\n\
             1. {} exists (or point RAINFALL_RISK_CONFIG at your config file)\n\
             2. All required environment variables are set (check .env.example)\n\
             3. Create a .env file if needed",
            e,
            config_path
        )
    })?;
    info!("Configuration loaded from {}", config_path);

    // First load is fatal; later reloads only log
    let mut loader = CachedLoader::new(config.data.clone());
    let mut dataset = loader.get().map_err(|e| {
        anyhow::anyhow!(
            "Failed to load data: {}\n\n\
             Check that every path under data.stations and data.floods in {} \
             points at a readable CSV file.",
            e,
            config_path
        )
    })?;

    let regions = dataset.regions();
    info!(
        "Loaded {} station rows across {} region(s), {} flood rows",
        dataset.stations.len(),
        regions.len(),
        dataset.floods.len()
    );

    let defaults = FilterSelection::from_defaults(&config.defaults, &regions);
    let mut selection = defaults.clone();

    let stdout = io::stdout();
    show(&mut stdout.lock(), &dataset, &selection)?;

    // Prompt on stderr so piping stdout captures only dashboards
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("> ");
        let Some(line) = lines.next() else {
            // EOF
            break;
        };
        let line = line?;

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => {
                writeln!(stdout.lock(), "{}", HELP)?;
                continue;
            }
            other => {
                selection.apply(&other, &defaults, &dataset.regions());
            }
        }

        // Pick up edited source files between interactions.
        match loader.get() {
            Ok(fresh) => dataset = fresh,
            Err(e) => error!("Reload failed, keeping previous data: {}", e),
        }

        show(&mut stdout.lock(), &dataset, &selection)?;
    }

    info!("Rainfall risk dashboard shutting down");
    Ok(())
}

fn show<W: Write>(out: &mut W, dataset: &Dataset, selection: &FilterSelection) -> io::Result<()> {
    let view = DashboardView::build(dataset, selection);
    render::render(out, &view)?;
    out.flush()
}
