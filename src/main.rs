//! sgram: a live spectrogram of the microphone input, in the terminal.

mod app;
mod audio;
mod commands;
mod config;
mod error;
mod logging;
mod setup;
mod spectrogram;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
