//! Default configuration values

/// Release configuration file name at the project root
pub const CONFIG_FILE: &str = "release.toml";

/// Manifest file name inside the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Default release output directory
pub const DEFAULT_OUTPUT_DIR: &str = "release";

/// Default PlatformIO build directory
pub const DEFAULT_BUILD_DIR: &str = ".pio/build";

/// File name of the merged flash image inside a target's build directory
pub const MERGED_IMAGE: &str = "merged-flash.bin";

/// Default flash offset for a merged image
pub const DEFAULT_OFFSET: &str = "0x0000";

/// Digest algorithm name recorded in the manifest
pub const DIGEST_ALGORITHM: &str = "SHA2-256";

/// Name of the root catalog section
pub const ROOT_SECTION: &str = "installable";

/// Default esptool flash size (let esptool detect it)
pub const DEFAULT_FLASH_SIZE: &str = "detect";

/// esptool flash mode used for merged images
pub const FLASH_MODE: &str = "dio";

/// Default location of the generated version source file
pub const STAMP_FILE: &str = "src/version.cpp";

/// Placeholder recorded when the project is not a git checkout
pub const NO_GIT: &str = " (noGit)";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
