use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use chapter_edit::{ChapterEditor, Config};

/// Edit the chapters of a video file in your text editor.
#[derive(Parser, Debug)]
#[command(name = "chapter-edit", version)]
struct Cli {
    /// Video file whose chapters to edit
    video: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("chapter_edit=info"))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help, version and wrong arguments all end the run without an error.
            let _ = e.print();
            return Ok(());
        }
    };

    let config = Config::load()?;
    log::debug!("Using {config:?}");

    let editor = ChapterEditor::new(config);
    let backup = editor.run(&cli.video)?;

    log::info!("Original kept as {}", backup.display());
    println!("New chapter metadata written to {}", cli.video.display());
    Ok(())
}
