use clap::Parser;
use shelf::Cli;
use shelf_core::cache::CachedSelection;
use shelf_core::config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/shelf-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("shelf debug log started, tail -f /tmp/shelf-debug.log");
    }

    // An explicit --config must load; a broken user file falls back to defaults.
    let config = match Config::load_with(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) if cli.config.is_none() => {
            tracing::warn!(error = %err, "config load failed, using defaults");
            Config::defaults()
        }
        Err(err) => return Err(err),
    };

    // Remote searches run on runtime workers; the picker loop stays on this
    // thread and polls for their results.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    let selector = cli.build_selector(&config)?;
    let selection = shelf_tui::run(selector, &config)?;

    match selection {
        CachedSelection::Resolved(entity) => {
            println!("{}", serde_json::to_string_pretty(&entity)?);
        }
        CachedSelection::Unresolved(id) => {
            println!("{}", serde_json::json!({ "id": id }));
        }
        CachedSelection::Empty => {}
    }
    Ok(())
}
