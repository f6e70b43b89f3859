//! Project initialization logic
//!
//! Creates a commented `release.toml` template for a firmware project.

use std::path::Path;

/// Entries to add to .gitignore
pub const GITIGNORE_ENTRIES: &[&str] = &["release/"];

/// Marker comment for the flashpack section in .gitignore
pub const GITIGNORE_MARKER: &str = "# flashpack";

/// Generate the default release configuration with comments
pub fn generate_config_content(product_name: &str, environments: &[String]) -> String {
    let envs: Vec<String> = if environments.is_empty() {
        vec!["firmware".to_string()]
    } else {
        environments.to_vec()
    };

    let mut images = String::new();
    let mut choices = String::new();
    for env in &envs {
        images.push_str(&format!(
            r#"
[[images]]
name = "{env}"
offset = "0x0000"
# source = ".pio/build/{env}/merged-flash.bin"
# path = "{env}.bin"
"#
        ));
        choices.push_str(&format!(
            r#"
[[catalog.choices.choices]]
name = "{env}"
description = "{product_name} for {env}"
choice_name = "Installation type"

[[catalog.choices.choices.choices]]
name = "install"
description = "Complete {product_name} installation"
erase = true
images = ["{env}"]
"#
        ));
    }

    format!(
        r#"# flashpack release configuration

[release]
name = "{product_name}"
# Source and release URLs are derived from the repository
repository = "https://github.com/OWNER/{product_name}"
funding_url = ""
# Defaults to the latest git tag
# version = "v1.0.0"
# output_dir = "release"
# build_dir = ".pio/build"
{images}
# Merged image layout for `flashpack merge`:
# [images.merge]
# chip = "esp32s3"
# flash_size = "8MB"
# parts = [
#   {{ offset = "0x0000", file = "bootloader.bin" }},
#   {{ offset = "0x8000", file = "partitions.bin" }},
#   {{ offset = "0x10000", file = "firmware.bin" }},
# ]

[catalog]
description = "Things you can install"
choice_name = "Processor type"

[[catalog.choices]]
name = "ESP32"
description = "{product_name} for ESP32"
choice_name = "Device type"
{choices}"#
    )
}

/// Generate .gitignore content for flashpack
pub fn generate_gitignore_content() -> String {
    let mut content = String::from(GITIGNORE_MARKER);
    content.push('\n');
    for entry in GITIGNORE_ENTRIES {
        content.push_str(entry);
        content.push('\n');
    }
    content
}

/// Append flashpack entries to existing .gitignore content
pub fn append_gitignore_entries(existing: &str) -> String {
    if existing.contains(GITIGNORE_MARKER) {
        return existing.to_string();
    }

    let mut result = existing.to_string();
    if !result.is_empty() && !result.ends_with('\n') {
        result.push('\n');
    }
    if !result.is_empty() {
        result.push('\n');
    }
    result.push_str(&generate_gitignore_content());
    result
}

/// Derive the product name from the project directory
pub fn derive_product_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| "firmware".to_string(), ToString::to_string)
}

/// PlatformIO environments declared in `platformio.ini`, in file order
pub fn platformio_environments(ini: &str) -> Vec<String> {
    ini.lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix("[env:")
                .and_then(|rest| rest.strip_suffix(']'))
                .map(|env| env.trim().to_string())
        })
        .filter(|env| !env.is_empty())
        .collect()
}
