use clap::Parser;
use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use randpath::{
    cli::Cli,
    config::AppConfig,
    console::{paint, Console, Tone},
    opener::Opener,
    shell::{CommandLoop, InputLines},
    watch::{ConsoleSink, WatchService},
    DirectorySet, DirectoryStore, RandomPicker,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    cli.setup_logging();

    let config = cli.apply(AppConfig::from_env());
    if let Err(err) = config.validate() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    let color = config.ui.color;
    let shutdown = CancellationToken::new();
    let s = shutdown.clone();
    ctrlc::set_handler(move || {
        eprintln!("\n{}", paint(Tone::Warning, "Interrupted by user. Exiting...", color));
        s.cancel();
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("randpath-watch")
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let dirs = DirectorySet::load(DirectoryStore::new(&config.store.dirs_file));
    tracing::debug!("Using directory list {}", config.store.dirs_file.display());

    // The watcher sees the list as it is now; later edits need a restart
    let watcher = if config.watcher.enabled {
        let _guard = runtime.enter();
        let sink = ConsoleSink::new(cli.output, color);
        Some(WatchService::new(dirs.snapshot(), sink, shutdown.child_token()).spawn())
    } else {
        None
    };

    let picker = match config.picker.seed {
        Some(seed) => RandomPicker::seeded(seed),
        None => RandomPicker::from_time(),
    };

    let input = InputLines::stdin(config.ui.input_poll_duration());
    let mut shell = CommandLoop::new(
        dirs,
        picker,
        Opener::system(),
        Console::stdout(color),
        shutdown.clone(),
    );
    let outcome = shell.run(&input);

    shutdown.cancel();
    if let Some(handle) = watcher {
        let grace = config.watcher.shutdown_grace_duration();
        if let Err(err) = runtime.block_on(handle.shutdown(grace)) {
            tracing::debug!("Watcher ended with: {}", err);
        }
    }

    outcome.context("Failed to write to the console")?;
    Ok(())
}
