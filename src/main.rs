use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use member_silhouette::{ensure_root, Config, SilhouetteBatchProcessor, U2NetRemover};

fn main() -> Result<()> {
    let config = Config::parse();

    ensure_root(&config.root_dir)?;
    ensure!(
        config.model_path.exists(),
        "Model path does not exist: {}",
        config.model_path.display()
    );

    let remover = U2NetRemover::new(&config.model_path, config.device_id)
        .with_context(|| format!("Failed to load model: {}", config.model_path.display()))?;

    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed}] {pos} members {wide_msg}",
    )?);
    progress_bar.enable_steady_tick(Duration::from_millis(100));

    let processor = SilhouetteBatchProcessor::new(remover).with_progress(progress_bar);
    let summary = processor.run(&config.root_dir)?;

    println!("{summary}");
    Ok(())
}
