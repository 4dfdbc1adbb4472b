use std::io::{stdin, stdout};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use lined::buffer::Buffer;
use lined::config::{global_config_path, Config};
use lined::editor::Editor;
use lined::logging;
use lined::terminal::{self, TerminalGuard};

/// A minimal full-screen terminal text editor
#[derive(Parser, Debug)]
#[command(name = "lined", version, about, long_about = None)]
struct Cli {
    /// File to edit; saved back with `S`
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Append logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(global_config_path);
    let config = Config::load(&config_path)?;
    let log_file = cli.log_file.clone().or_else(|| config.log_file.clone());
    logging::init(log_file.as_deref())?;
    tracing::info!("starting with {config:?}");

    let mut buffer = Buffer::new().with_page_size(config.page_size);
    if let Some(file) = &cli.file {
        buffer.load_file(file);
    }

    // Restores the terminal when dropped, before any error is printed.
    let _terminal = TerminalGuard::new()?;
    let reserved_rows = config.reserved_rows;
    let viewport = terminal::viewport(reserved_rows)?;

    let mut editor = Editor::new(buffer, stdout(), viewport, &config)
        .with_viewport_source(move || terminal::viewport(reserved_rows))
        .with_file(cli.file);
    editor.run(stdin().lock()).context("editor loop failed")?;

    tracing::info!("exiting");
    Ok(())
}
