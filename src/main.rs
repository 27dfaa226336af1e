pub mod capture;
pub mod config;
pub mod cue;
pub mod event;
pub mod session;
pub mod stats;
pub mod storage;
pub mod summary;

use crate::config::TrackerConfig;
use crate::session::Session;
use crate::summary::ConsolePresenter;
use color_eyre::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = TrackerConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let session = Session::create(config)?;
    let session = session.start()?;
    let session = session.run().await?;
    let session = session.finish().await?;
    session.present(&ConsolePresenter);

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
