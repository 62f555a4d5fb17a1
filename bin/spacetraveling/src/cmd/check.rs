//! Check command - validate configuration and content store access

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use spacetraveling_cms::ContentClient;
use spacetraveling_core::Config;

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Run the check command.
///
/// Validates the configuration, then queries the content store once for the
/// first listing page and the prerenderable paths.
pub async fn run(config_path: &Path, fixtures: Option<&Path>) -> Result<()> {
    tracing::info!(?config_path, "Checking configuration and content store");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            println!("  ✗ Configuration invalid: {e}");
            bail!("Validation failed: {e}");
        }
    };
    check_config_values(&config, &mut result);

    println!("\nChecking content store...");
    match crate::content_client(&config, fixtures) {
        Ok(client) => check_store(client.as_ref(), &config, &mut result).await,
        Err(e) => result.add_error(format!("Content client error: {e}")),
    }

    // Print summary
    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if !result.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Check configuration values that are valid but probably unintended.
fn check_config_values(config: &Config, result: &mut ValidationResult) {
    if !config.site.base_url.starts_with("https://") {
        result.add_warning(format!(
            "site.base_url is not HTTPS: {}",
            config.site.base_url
        ));
    }

    if config.site.description.is_none() {
        result.add_warning("site.description is not set; the home page has no meta description");
    }

    if config.comments.is_none() {
        println!("  - Comments disabled (no [comments] section)");
    }
}

async fn check_store(client: &dyn ContentClient, config: &Config, result: &mut ValidationResult) {
    match client.query_posts(1, config.cms.page_size).await {
        Ok(page) => {
            println!("  ✓ Listing query returned {} post(s)", page.results.len());
            if page.results.is_empty() {
                result.add_warning("The content store has no published posts");
            }
        }
        Err(e) => {
            println!("  ✗ Listing query failed");
            result.add_error(format!("Listing query failed: {e}"));
            return;
        }
    }

    match client.query_uids(config.cms.paths_page_size).await {
        Ok(uids) => println!("  ✓ {} post path(s) to prerender", uids.len()),
        Err(e) => result.add_warning(format!(
            "Paths query failed, posts will only render on demand: {e}"
        )),
    }
}
