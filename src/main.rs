mod app;
mod audio;
mod commands;
mod config;
mod error;
mod logging;
mod recorder;
mod setup;
mod sound_test;
mod state;
mod ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
