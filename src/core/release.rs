//! Release configuration (release.toml) and manifest assembly
//!
//! `release.toml` declares the product metadata, the build targets whose
//! merged images are published, and the catalog tree shown by the
//! installer. Supports environment variable substitution using ${VAR}
//! syntax in every string value.

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::defaults::{
    DEFAULT_BUILD_DIR, DEFAULT_FLASH_SIZE, DEFAULT_OFFSET, DEFAULT_OUTPUT_DIR, MERGED_IMAGE,
    ROOT_SECTION,
};
use crate::config::urls;
use crate::core::catalog::{ChoiceList, InstallType};
use crate::core::manifest::{Manifest, ReleaseInfo};
use crate::core::registry::{normalize_destination, Image, ImageRegistry};
use crate::error::{CatalogError, ConfigError, FlashpackError};

/// The release configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReleaseConfig {
    /// Product metadata
    pub release: ReleaseSection,

    /// Published images, one per build target
    #[serde(default)]
    pub images: Vec<ImageConfig>,

    /// Installer menu tree
    pub catalog: CatalogConfig,
}

/// `[release]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReleaseSection {
    /// Product name
    pub name: String,

    /// Repository URL that source and release URLs derive from
    #[serde(default)]
    pub repository: Option<String>,

    /// Fixed version; the latest git tag is used when absent
    #[serde(default)]
    pub version: Option<String>,

    /// Explicit source URL (overrides the derived one)
    #[serde(default)]
    pub source_url: Option<String>,

    /// Explicit release URL (overrides the derived one)
    #[serde(default)]
    pub release_url: Option<String>,

    #[serde(default)]
    pub funding_url: String,

    /// Release directory, relative to the project root
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// PlatformIO build directory, relative to the project root
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_build_dir() -> String {
    DEFAULT_BUILD_DIR.to_string()
}

fn default_offset() -> String {
    DEFAULT_OFFSET.to_string()
}

fn default_flash_size() -> String {
    DEFAULT_FLASH_SIZE.to_string()
}

fn default_install_name() -> String {
    "install".to_string()
}

fn default_catalog_description() -> String {
    "Things you can install".to_string()
}

/// `[[images]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageConfig {
    /// Image name, usually the build environment name
    pub name: String,

    /// Flash offset as a hex string
    #[serde(default = "default_offset")]
    pub offset: String,

    /// Artifact path relative to the project root
    #[serde(default)]
    pub source: Option<String>,

    /// Destination relative to the release directory
    #[serde(default)]
    pub path: Option<String>,

    /// Layout used by `flashpack merge`
    #[serde(default)]
    pub merge: Option<MergeConfig>,
}

/// `[images.merge]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeConfig {
    /// esptool chip name (esp32, esp32s3, ...)
    pub chip: String,

    #[serde(default = "default_flash_size")]
    pub flash_size: String,

    /// Parts in flashing order
    pub parts: Vec<MergePart>,
}

/// One blob of a merged image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergePart {
    pub offset: String,

    /// File relative to the target's build directory
    pub file: String,
}

/// `[catalog]` table (the root section)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_description")]
    pub description: String,

    pub choice_name: String,

    #[serde(default)]
    pub choices: Vec<ChoiceConfig>,
}

/// A catalog entry.
///
/// Tables with an `images` or `erase` key are installables, every other
/// table is a section. Unknown keys are rejected in both, so a misspelled
/// key fails to parse instead of turning an installable into an empty leaf.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ChoiceConfig {
    Installable(InstallableConfig),
    Section(SectionConfig),
}

impl<'de> Deserialize<'de> for ChoiceConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let table = toml::Table::deserialize(deserializer)?;
        let installable = table.contains_key("images") || table.contains_key("erase");
        let value = toml::Value::Table(table);
        if installable {
            value
                .try_into()
                .map(Self::Installable)
                .map_err(D::Error::custom)
        } else {
            value.try_into().map(Self::Section).map_err(D::Error::custom)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InstallableConfig {
    #[serde(default = "default_install_name")]
    pub name: String,

    pub description: String,

    #[serde(default)]
    pub erase: bool,

    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    pub name: String,

    pub description: String,

    #[serde(default)]
    pub choice_name: Option<String>,

    #[serde(default)]
    pub choices: Vec<ChoiceConfig>,
}

impl ImageConfig {
    /// Artifact location; defaults to `<build_dir>/<name>/merged-flash.bin`
    pub fn source_path(&self, project_root: &Path, build_dir: &str) -> PathBuf {
        match &self.source {
            Some(source) => project_root.join(source),
            None => project_root
                .join(build_dir)
                .join(&self.name)
                .join(MERGED_IMAGE),
        }
    }

    /// Destination inside the release directory; defaults to `<name>.bin`
    pub fn destination(&self) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| format!("{}.bin", self.name))
    }
}

fn env_var_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid env var regex")
    })
}

fn hex_offset_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0[xX][0-9a-fA-F]+$").expect("Invalid offset regex"))
}

/// Substitute environment variables in a string using ${VAR} syntax.
///
/// Referencing an unset variable is an error.
///
/// # Examples
/// ```
/// use flashpack::core::release::substitute_env_vars;
///
/// std::env::set_var("FLASHPACK_DOC_VAR", "hello");
/// let result = substitute_env_vars("prefix_${FLASHPACK_DOC_VAR}_suffix").unwrap();
/// assert_eq!(result, "prefix_hello_suffix");
/// std::env::remove_var("FLASHPACK_DOC_VAR");
/// ```
pub fn substitute_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut last_end = 0;
    let mut output = String::new();

    for cap in env_var_regex().captures_iter(input) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let var_name = &cap[1];

        output.push_str(&input[last_end..full_match.start()]);
        let value = std::env::var(var_name).map_err(|_| {
            ConfigError::EnvSubstitution(format!("environment variable '{var_name}' is not set"))
        })?;
        output.push_str(&value);

        last_end = full_match.end();
    }

    output.push_str(&input[last_end..]);
    Ok(output)
}

/// Recursively substitute environment variables in a TOML value
fn substitute_in_value(value: &mut toml::Value) -> Result<(), ConfigError> {
    match value {
        toml::Value::String(s) => {
            *s = substitute_env_vars(s)?;
        }
        toml::Value::Array(arr) => {
            for item in arr.iter_mut() {
                substitute_in_value(item)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                substitute_in_value(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}

impl ReleaseConfig {
    /// Load configuration from file path, substituting ${VAR} references
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let mut value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        substitute_in_value(&mut value)?;

        value.try_into::<Self>().map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from a TOML string (no substitution)
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Release metadata for `version`
    pub fn release_info(&self, version: &str) -> ReleaseInfo {
        let repository = self.release.repository.as_deref().unwrap_or_default();
        ReleaseInfo {
            name: self.release.name.clone(),
            version: version.to_string(),
            source_url: self
                .release
                .source_url
                .clone()
                .unwrap_or_else(|| urls::source_url(repository, version)),
            release_url: self
                .release
                .release_url
                .clone()
                .unwrap_or_else(|| urls::release_url(repository, version)),
            funding_url: self.release.funding_url.clone(),
        }
    }

    /// Release directory under `project_root`
    pub fn output_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.release.output_dir)
    }

    /// Look up an image entry by name
    pub fn image(&self, name: &str) -> Option<&ImageConfig> {
        self.images.iter().find(|image| image.name == name)
    }

    /// Validate the configuration and report all problems at once.
    ///
    /// Checks names, destinations, merge layouts, catalog labels and that
    /// every installable refers to a declared image. Image offsets are kept
    /// verbatim; unusual ones are reported by [`Self::warnings`]. File
    /// existence is checked separately by [`Self::missing_sources`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.release.name.trim().is_empty() {
            problems.push("Field 'release.name' cannot be empty".to_string());
        }
        if self.release.repository.is_none()
            && (self.release.source_url.is_none() || self.release.release_url.is_none())
        {
            problems.push(
                "Set 'release.repository' or both 'release.source_url' and 'release.release_url'"
                    .to_string(),
            );
        }

        let mut names = HashSet::new();
        let mut destinations = HashSet::new();
        for image in &self.images {
            if image.name.is_empty() {
                problems.push("Image with empty name".to_string());
            } else if !names.insert(image.name.as_str()) {
                problems.push(format!("Duplicate image name '{}'", image.name));
            }
            match normalize_destination(&image.destination()) {
                Some(destination) => {
                    if !destinations.insert(destination.clone()) {
                        problems.push(format!(
                            "Image '{}' reuses destination path '{destination}'",
                            image.name
                        ));
                    }
                }
                None => problems.push(format!(
                    "Image '{}' has unusable destination '{}'",
                    image.name,
                    image.destination()
                )),
            }
            if let Some(merge) = &image.merge {
                if merge.parts.is_empty() {
                    problems.push(format!("Image '{}' merge layout has no parts", image.name));
                }
                for part in &merge.parts {
                    if !hex_offset_regex().is_match(&part.offset) {
                        problems.push(format!(
                            "Image '{}' merge part '{}' has invalid offset '{}'",
                            image.name, part.file, part.offset
                        ));
                    }
                }
            }
        }

        if self.catalog.choice_name.trim().is_empty() {
            problems.push("Field 'catalog.choice_name' cannot be empty".to_string());
        }
        validate_choices(&self.catalog.choices, ROOT_SECTION, &names, &mut problems);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { problems })
        }
    }

    /// Non-fatal oddities: offsets that are not hex and installables that
    /// flash nothing
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .images
            .iter()
            .filter(|image| !hex_offset_regex().is_match(&image.offset))
            .map(|image| {
                format!(
                    "Image '{}' has offset '{}', which is not a hex address",
                    image.name, image.offset
                )
            })
            .collect();
        empty_installables(&self.catalog.choices, ROOT_SECTION, &mut warnings);
        warnings
    }

    /// Declared image sources that do not exist on disk
    pub fn missing_sources(&self, project_root: &Path) -> Vec<(String, PathBuf)> {
        self.images
            .iter()
            .map(|image| {
                (
                    image.name.clone(),
                    image.source_path(project_root, &self.release.build_dir),
                )
            })
            .filter(|(_, path)| !path.is_file())
            .collect()
    }
}

fn empty_installables(choices: &[ChoiceConfig], path: &str, warnings: &mut Vec<String>) {
    for choice in choices {
        match choice {
            ChoiceConfig::Installable(installable) if installable.images.is_empty() => {
                warnings.push(format!("Installable '{path}/{}' lists no images", installable.name));
            }
            ChoiceConfig::Installable(_) => {}
            ChoiceConfig::Section(section) => {
                let here = format!("{path}/{}", section.name);
                empty_installables(&section.choices, &here, warnings);
            }
        }
    }
}

fn validate_choices(
    choices: &[ChoiceConfig],
    path: &str,
    images: &HashSet<&str>,
    problems: &mut Vec<String>,
) {
    for choice in choices {
        match choice {
            ChoiceConfig::Installable(installable) => {
                let here = format!("{path}/{}", installable.name);
                for image in &installable.images {
                    if !images.contains(image.as_str()) {
                        problems.push(format!(
                            "Installable '{here}' references unknown image '{image}'"
                        ));
                    }
                }
            }
            ChoiceConfig::Section(section) => {
                let here = format!("{path}/{}", section.name);
                if section.choice_name.is_none() && !section.choices.is_empty() {
                    problems.push(format!("Section '{here}' has choices but no choice_name"));
                }
                validate_choices(&section.choices, &here, images, problems);
            }
        }
    }
}

/// Build the manifest for `version`, see [`build_manifest_with`]
pub fn build_manifest(
    config: &ReleaseConfig,
    version: &str,
    project_root: &Path,
) -> Result<Manifest, FlashpackError> {
    build_manifest_with(config, version, project_root, |_, _| {})
}

/// Register every declared image, then build the catalog tree.
///
/// `on_image` is called after each successful registration. The first
/// failing image or catalog reference aborts the build; nothing is written.
pub fn build_manifest_with(
    config: &ReleaseConfig,
    version: &str,
    project_root: &Path,
    mut on_image: impl FnMut(&str, &Image),
) -> Result<Manifest, FlashpackError> {
    let mut manifest = Manifest::new(
        config.release_info(version),
        config.output_dir(project_root),
        &config.catalog.description,
        &config.catalog.choice_name,
    );

    for image in &config.images {
        let source = image.source_path(project_root, &config.release.build_dir);
        let registered =
            manifest.register_image(&image.name, &image.offset, &source, &image.destination())?;
        on_image(&image.name, registered);
    }

    let (registry, root) = manifest
        .catalog_mut()
        .ok_or_else(|| CatalogError::TerminalSection {
            section: ROOT_SECTION.to_string(),
        })?;
    add_choices(root, registry, &config.catalog.choices)?;

    Ok(manifest)
}

/// Append configured choices beneath `list`, in declaration order
fn add_choices(
    list: &mut ChoiceList,
    registry: &ImageRegistry,
    choices: &[ChoiceConfig],
) -> Result<(), CatalogError> {
    for choice in choices {
        match choice {
            ChoiceConfig::Installable(installable) => {
                let install_type = InstallType::new(&installable.name, &installable.description);
                list.add_installable(
                    registry,
                    &install_type,
                    installable.erase,
                    installable.images.as_slice(),
                )?;
            }
            ChoiceConfig::Section(section) => match &section.choice_name {
                Some(label) => {
                    let children = list.add_section(&section.name, &section.description, label);
                    add_choices(children, registry, &section.choices)?;
                }
                None if section.choices.is_empty() => {
                    list.add_terminal_section(&section.name, &section.description);
                }
                None => {
                    return Err(CatalogError::TerminalSection {
                        section: section.name.clone(),
                    });
                }
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageError;
    use crate::test_utils::SAMPLE_CONFIG;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn write_target(root: &Path, name: &str, data: &[u8]) {
        let dir = root.join(".pio/build").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("merged-flash.bin"), data).unwrap();
    }

    // ============================================
    // Unit Tests
    // ============================================

    #[test]
    fn test_sample_config_parses() {
        let config = ReleaseConfig::from_toml(SAMPLE_CONFIG).expect("sample should parse");

        assert_eq!(config.release.name, "FluidDial");
        assert_eq!(config.release.output_dir, "release");
        assert_eq!(config.release.build_dir, ".pio/build");
        assert_eq!(config.images.len(), 2);
        assert_eq!(config.images[0].offset, "0x0000");
        assert_eq!(config.catalog.choice_name, "Processor type");
        assert_eq!(config.catalog.choices.len(), 2);

        let ChoiceConfig::Section(esp32s3) = &config.catalog.choices[0] else {
            panic!("expected a section");
        };
        let ChoiceConfig::Section(m5dial) = &esp32s3.choices[0] else {
            panic!("expected a section");
        };
        let ChoiceConfig::Installable(install) = &m5dial.choices[0] else {
            panic!("expected an installable");
        };
        assert_eq!(install.name, "install");
        assert!(install.erase);
        assert_eq!(install.images, vec!["m5dial"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_image_defaults() {
        let config = ReleaseConfig::from_toml(SAMPLE_CONFIG).unwrap();
        let image = config.image("cyddial").unwrap();
        let root = Path::new("/proj");
        assert_eq!(
            image.source_path(root, &config.release.build_dir),
            Path::new("/proj/.pio/build/cyddial/merged-flash.bin")
        );
        assert_eq!(image.destination(), "cyddial.bin");
    }

    #[test]
    fn test_release_info_derives_urls() {
        let config = ReleaseConfig::from_toml(SAMPLE_CONFIG).unwrap();
        let info = config.release_info("v3.1.0");
        assert_eq!(info.source_url, "https://github.com/bdring/FluidDial/tree/v3.1.0");
        assert_eq!(
            info.release_url,
            "https://github.com/bdring/FluidDial/releases/tag/v3.1.0"
        );
    }

    #[test]
    fn test_validate_reports_all_problems() {
        let config = ReleaseConfig::from_toml(
            r#"
[release]
name = ""
repository = "https://example.com/repo"

[[images]]
name = "m5dial"
offset = "4096"

[[images]]
name = "m5dial"

[catalog]
choice_name = "Dial type"

[[catalog.choices]]
name = "CYD"
description = "CYD dial"

[[catalog.choices.choices]]
description = "Complete installation"
erase = true
images = ["cyddial"]
"#,
        )
        .unwrap();

        let Err(ConfigError::Invalid { problems }) = config.validate() else {
            panic!("expected validation failure");
        };
        let joined = problems.join("\n");
        assert!(joined.contains("release.name"), "{joined}");
        assert!(!joined.contains("4096"), "offsets are not validated: {joined}");
        assert!(joined.contains("Duplicate image name 'm5dial'"), "{joined}");
        assert!(joined.contains("installable/CYD"), "{joined}");
        assert!(joined.contains("unknown image 'cyddial'"), "{joined}");

        let warnings = config.warnings();
        assert!(warnings.iter().any(|w| w.contains("offset '4096'")), "{warnings:?}");
    }

    #[test]
    fn test_misspelled_installable_key_fails_to_parse() {
        let config = SAMPLE_CONFIG.replacen("images = [\"m5dial\"]", "image = [\"m5dial\"]", 1);

        let err = ReleaseConfig::from_toml(&config).unwrap_err();
        assert!(err.to_string().contains("image"), "{err}");
    }

    #[test]
    fn test_misspelled_section_key_fails_to_parse() {
        let config =
            SAMPLE_CONFIG.replacen("choice_name = \"Dial type\"", "choice = \"Dial type\"", 1);

        assert!(ReleaseConfig::from_toml(&config).is_err());
    }

    #[test]
    fn test_equivalent_destinations_are_invalid() {
        let mut config = ReleaseConfig::from_toml(SAMPLE_CONFIG).unwrap();
        config.images[0].path = Some("fw.bin".to_string());
        config.images[1].path = Some("./fw.bin".to_string());

        let Err(ConfigError::Invalid { problems }) = config.validate() else {
            panic!("expected validation failure");
        };
        assert!(problems[0].contains("reuses destination path 'fw.bin'"), "{problems:?}");

        config.images[1].path = Some("manifest.json".to_string());
        let Err(ConfigError::Invalid { problems }) = config.validate() else {
            panic!("expected validation failure");
        };
        assert!(problems[0].contains("unusable destination"), "{problems:?}");
    }

    #[test]
    fn test_empty_installable_is_only_a_warning() {
        let mut config = ReleaseConfig::from_toml(SAMPLE_CONFIG).unwrap();
        let ChoiceConfig::Section(esp32) = &mut config.catalog.choices[1] else {
            panic!("expected a section");
        };
        let ChoiceConfig::Section(cyd) = &mut esp32.choices[0] else {
            panic!("expected a section");
        };
        let ChoiceConfig::Installable(install) = &mut cyd.choices[0] else {
            panic!("expected an installable");
        };
        install.images.clear();

        assert!(config.validate().is_ok());
        assert_eq!(
            config.warnings(),
            vec!["Installable 'installable/ESP32/CYD/install' lists no images".to_string()]
        );
    }

    #[test]
    fn test_build_rejects_overlapping_destinations() {
        let temp = TempDir::new().unwrap();
        write_target(temp.path(), "m5dial", b"m5dial");
        write_target(temp.path(), "cyddial", b"cyddial");
        let mut config = ReleaseConfig::from_toml(SAMPLE_CONFIG).unwrap();
        config.images[0].path = Some("fw.bin".to_string());
        config.images[1].path = Some("./fw.bin".to_string());

        let err = build_manifest(&config, "v1", temp.path()).unwrap_err();
        assert!(matches!(
            err,
            FlashpackError::Image(ImageError::DestinationInUse { ref owner, .. })
                if owner == "m5dial"
        ));
        let copied = std::fs::read(temp.path().join("release/fw.bin")).unwrap();
        assert_eq!(copied, b"m5dial");
    }

    #[test]
    fn test_env_substitution_in_load() {
        let temp = TempDir::new().unwrap();
        std::env::set_var("FLASHPACK_TEST_FUNDING", "https://fund.example.com");
        let path = temp.path().join("release.toml");
        std::fs::write(
            &path,
            SAMPLE_CONFIG.replace(
                "https://www.paypal.com/donate/?hosted_button_id=8DYLB6ZYYDG7Y",
                "${FLASHPACK_TEST_FUNDING}",
            ),
        )
        .unwrap();

        let config = ReleaseConfig::load(&path).unwrap();
        assert_eq!(config.release.funding_url, "https://fund.example.com");
        std::env::remove_var("FLASHPACK_TEST_FUNDING");
    }

    #[test]
    fn test_unset_env_var_is_an_error() {
        let result = substitute_env_vars("${FLASHPACK_TEST_SURELY_UNSET_VAR}");
        assert!(matches!(result, Err(ConfigError::EnvSubstitution(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = ReleaseConfig::load(&temp.path().join("release.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_build_manifest_from_sample() {
        let temp = TempDir::new().unwrap();
        write_target(temp.path(), "m5dial", &[0xAA; 500]);
        write_target(temp.path(), "cyddial", &[0x55; 120]);
        let config = ReleaseConfig::from_toml(SAMPLE_CONFIG).unwrap();

        let mut seen = Vec::new();
        let manifest = build_manifest_with(&config, "v3.0.1", temp.path(), |name, image| {
            seen.push((name.to_string(), image.size));
        })
        .unwrap();

        assert_eq!(seen, vec![("m5dial".to_string(), 500), ("cyddial".to_string(), 120)]);
        assert_eq!(manifest.images().len(), 2);
        assert!(temp.path().join("release/m5dial.bin").is_file());

        let json: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(json["version"], "v3.0.1");
        assert_eq!(json["installable"]["choices"][0]["name"], "ESP32-S3");
        assert_eq!(json["installable"]["choices"][0]["choice-name"], "Dial type");
        assert_eq!(
            json["installable"]["choices"][1]["choices"][0]["choices"][0]["images"],
            serde_json::json!(["cyddial"])
        );
    }

    #[test]
    fn test_build_manifest_missing_source_aborts() {
        let temp = TempDir::new().unwrap();
        write_target(temp.path(), "m5dial", b"m5");
        let config = ReleaseConfig::from_toml(SAMPLE_CONFIG).unwrap();

        let err = build_manifest(&config, "v1", temp.path()).unwrap_err();
        assert!(matches!(
            err,
            FlashpackError::Image(ImageError::SourceUnavailable { ref name, .. })
                if name == "cyddial"
        ));
        assert_eq!(config.missing_sources(temp.path()).len(), 1);
    }

    #[test]
    fn test_build_manifest_duplicate_image_aborts() {
        let temp = TempDir::new().unwrap();
        write_target(temp.path(), "m5dial", b"m5");
        let mut config = ReleaseConfig::from_toml(SAMPLE_CONFIG).unwrap();
        config.images[1] = config.images[0].clone();
        config.images[1].path = Some("again.bin".to_string());

        let err = build_manifest(&config, "v1", temp.path()).unwrap_err();
        assert!(matches!(err, FlashpackError::Image(ImageError::Duplicate { .. })));
    }

    #[test]
    fn test_build_manifest_missing_reference_aborts() {
        let temp = TempDir::new().unwrap();
        write_target(temp.path(), "m5dial", b"m5");
        let mut config = ReleaseConfig::from_toml(SAMPLE_CONFIG).unwrap();
        config.images.retain(|image| image.name == "m5dial");

        let err = build_manifest(&config, "v1", temp.path()).unwrap_err();
        match err {
            FlashpackError::Catalog(CatalogError::MissingImage { image, .. }) => {
                assert_eq!(image, "cyddial");
            }
            e => panic!("Expected MissingImage error, got: {e:?}"),
        }
    }

    #[test]
    fn test_labelless_section_with_children_is_rejected() {
        let temp = TempDir::new().unwrap();
        write_target(temp.path(), "m5dial", b"m5");
        let config = ReleaseConfig::from_toml(
            r#"
[release]
name = "FluidDial"
repository = "https://github.com/bdring/FluidDial"

[[images]]
name = "m5dial"

[catalog]
choice_name = "Dial type"

[[catalog.choices]]
name = "M5Dial"
description = "FluidDial for M5Dial"

[[catalog.choices.choices]]
description = "Complete installation"
images = ["m5dial"]
"#,
        )
        .unwrap();

        let err = build_manifest(&config, "v1", temp.path()).unwrap_err();
        assert!(matches!(
            err,
            FlashpackError::Catalog(CatalogError::TerminalSection { ref section })
                if section == "M5Dial"
        ));
    }

    // ============================================
    // Property-Based Tests
    // ============================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any hex offset passes validation and is kept verbatim
        #[test]
        fn prop_hex_offsets_accepted(value in 0u32..0x0100_0000) {
            let offset = format!("0x{value:x}");
            let mut config = ReleaseConfig::from_toml(SAMPLE_CONFIG).unwrap();
            config.images[0].offset = offset.clone();
            prop_assert!(config.validate().is_ok());
            prop_assert!(config.warnings().is_empty());
            prop_assert_eq!(&config.images[0].offset, &offset);
        }

        /// Decimal offsets are kept verbatim and only warned about
        #[test]
        fn prop_decimal_offsets_warned(value in 1u32..1_000_000) {
            let mut config = ReleaseConfig::from_toml(SAMPLE_CONFIG).unwrap();
            config.images[0].offset = value.to_string();
            prop_assert!(config.validate().is_ok());
            prop_assert_eq!(config.warnings().len(), 1);
        }
    }
}
