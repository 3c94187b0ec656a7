mod actions;
mod api;
mod app;
mod config;
mod constants;
mod events;
mod fetcher;
mod state;
mod ui;

use std::io;
use std::sync::Arc;
use std::sync::mpsc;

use crossterm::{
    ExecutableCommand,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use app::App;
use config::Config;
use gc_feed::LogFilter;
use state::State;

fn main() -> io::Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("gateway-console: {}", message);
            std::process::exit(1);
        }
    };
    let api = match api::LogApi::new(&config) {
        Ok(api) => Arc::new(api),
        Err(error) => {
            eprintln!("gateway-console: {}", error);
            std::process::exit(1);
        }
    };

    // Panic hook: restore the terminal and keep the panic on disk.
    // Without this a panic leaves the terminal in raw mode + alternate
    // screen and the error is lost with it.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);

        let error_dir = std::path::Path::new("errors");
        let _ = std::fs::create_dir_all(error_dir);
        let ts = state::now_ms() / 1000;
        let backtrace = std::backtrace::Backtrace::force_capture();
        let message = format!("[{}] {}\n\n{}\n\n---\n", ts, info, backtrace);
        let _ = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(error_dir.join("panic.log"))
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(message.as_bytes())
            });

        default_hook(info);
    }));

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let (tx, rx) = mpsc::channel();
    let mut app = App::new(State::new(LogFilter::default()), api, config, tx);
    let result = app.run(&mut terminal, &rx);

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    result
}
