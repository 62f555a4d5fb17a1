//! Build command - prerenders the site from the content store

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use spacetraveling_generator::Builder;

use super::load_config;

/// Run the build command.
///
/// Renders the listing pages and every post the content store reports into
/// `output`, or the configured output directory.
pub async fn run(config_path: &Path, output: Option<&Path>, fixtures: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?output, ?fixtures, "Starting build");

    let mut config = load_config(config_path)?;

    // Override output directory if specified
    if let Some(output) = output {
        config.build.output_dir = output.to_string_lossy().to_string();
    }
    let output_dir = Path::new(&config.build.output_dir).to_path_buf();

    let client = crate::content_client(&config, fixtures)
        .wrap_err("Failed to create content client")?;

    let stats = Builder::new(config, client.as_ref(), &output_dir)
        .build()
        .await
        .wrap_err("Build failed")?;

    let duration = start.elapsed();

    // Print build statistics
    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  List pages: {}", stats.list_pages);
    println!("  Posts:      {}", stats.posts);
    if stats.skipped > 0 {
        println!("  Skipped:    {} (rendered on demand by `serve`)", stats.skipped);
    }
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", output_dir.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}
