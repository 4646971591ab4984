// Story builder console entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config (copying defaults on first start)
// 3. Create the room
// 4. Run the console until `quit` or end of input

mod console;

use anyhow::Context;
use storybuilder_core::config;
use storybuilder_core::room::Room;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Story builder starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: turn limit {}s, max length {}, vote ratio {}",
        config.rules.turn_time_limit, config.rules.max_entry_length, config.vote.acceptance_ratio
    );

    let room_name = std::env::args().nth(1).unwrap_or_else(|| "lobby".to_string());
    let mut room = Room::new(room_name, config.game_rules(), config.vote);

    println!("Story builder room \"{}\". Type `help` for commands.", room.name);
    console::run(&mut room, tokio::io::stdin(), tokio::io::stdout())
        .await
        .context("console I/O failed")?;

    info!("Story builder shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (the terminal is used by the console).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("storybuilder.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storybuilder=info,storybuilder_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
