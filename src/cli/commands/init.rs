//! CLI implementation for `flashpack init` command
//!
//! Writes a release.toml template, seeded with the PlatformIO environments
//! when a platformio.ini is present.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::cli::output::{print_detail, print_success};
use crate::config::defaults::CONFIG_FILE;
use crate::core::init::{
    append_gitignore_entries, derive_product_name, generate_config_content,
    generate_gitignore_content, platformio_environments,
};

/// Execute the init command
pub fn execute(path: &Path, name: Option<String>, force: bool) -> Result<()> {
    let config_path = path.join(CONFIG_FILE);
    if config_path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite it.",
            config_path.display()
        );
    }

    let platformio_ini = path.join("platformio.ini");
    let environments = if platformio_ini.is_file() {
        let ini = std::fs::read_to_string(&platformio_ini)
            .with_context(|| format!("Failed to read {}", platformio_ini.display()))?;
        platformio_environments(&ini)
    } else {
        Vec::new()
    };
    tracing::info!("Found {} PlatformIO environments", environments.len());

    let product_name = name.unwrap_or_else(|| derive_product_name(path));
    let content = generate_config_content(&product_name, &environments);
    std::fs::write(&config_path, &content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    // Handle .gitignore
    let gitignore_path = path.join(".gitignore");
    let gitignore_existed = gitignore_path.exists();
    let gitignore_content = if gitignore_existed {
        let existing = std::fs::read_to_string(&gitignore_path)
            .with_context(|| format!("Failed to read {}", gitignore_path.display()))?;
        append_gitignore_entries(&existing)
    } else {
        generate_gitignore_content()
    };
    std::fs::write(&gitignore_path, &gitignore_content)
        .with_context(|| format!("Failed to write {}", gitignore_path.display()))?;

    print_success(&format!("Created {} for {product_name}", config_path.display()));
    if !environments.is_empty() {
        print_detail(&format!("Images: {}", environments.join(", ")));
    }
    if gitignore_existed {
        print_detail("Updated .gitignore");
    } else {
        print_detail("Created .gitignore");
    }

    Ok(())
}
