//! Test utilities for unit and property-based tests
//!
//! This module provides generators for proptest and fixtures shared by the
//! in-module tests.

use tempfile::TempDir;

use crate::core::registry::ImageRegistry;

/// Release configuration mirroring the FluidDial release layout
pub const SAMPLE_CONFIG: &str = r#"
[release]
name = "FluidDial"
repository = "https://github.com/bdring/FluidDial"
funding_url = "https://www.paypal.com/donate/?hosted_button_id=8DYLB6ZYYDG7Y"

[[images]]
name = "m5dial"
offset = "0x0000"

[[images]]
name = "cyddial"

[catalog]
description = "Things you can install"
choice_name = "Processor type"

[[catalog.choices]]
name = "ESP32-S3"
description = "ESP32-S3 based dials"
choice_name = "Dial type"

[[catalog.choices.choices]]
name = "M5Dial"
description = "FluidDial for M5Dial"
choice_name = "Installation type"

[[catalog.choices.choices.choices]]
name = "install"
description = "Complete FluidDial installation"
erase = true
images = ["m5dial"]

[[catalog.choices]]
name = "ESP32"
description = "ESP32 based dials"
choice_name = "Dial type"

[[catalog.choices.choices]]
name = "CYD"
description = "FluidDial for CYD Dial"
choice_name = "Installation type"

[[catalog.choices.choices.choices]]
name = "install"
description = "Complete FluidDial installation"
erase = true
images = ["cyddial"]
"#;

/// Registry holding one small image per name, backed by a temp directory
pub fn registry_with(names: &[&str]) -> (TempDir, ImageRegistry) {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let mut registry = ImageRegistry::new(temp.path().join("release"));
    for name in names {
        let source = temp.path().join(format!("{name}.src"));
        std::fs::write(&source, name.as_bytes()).expect("Failed to write image");
        registry
            .register_image(name, "0x0000", &source, &format!("{name}.bin"))
            .expect("Failed to register image");
    }
    (temp, registry)
}

pub mod generators {
    use proptest::prelude::*;

    /// Generate a valid image name (lowercase alphanumeric with hyphens)
    pub fn image_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,20}[a-z0-9]?".prop_filter("Name must not be empty", |s| !s.is_empty())
    }

    /// Generate a flash offset string
    pub fn flash_offset() -> impl Strategy<Value = String> {
        (0u32..0x0100_0000).prop_map(|value| format!("0x{value:04x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_image_name_generator(name in image_name()) {
            prop_assert!(!name.is_empty());
            let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-';
            prop_assert!(name.chars().all(allowed));
        }

        #[test]
        fn test_flash_offset_generator(offset in flash_offset()) {
            prop_assert!(offset.starts_with("0x"));
            prop_assert!(u32::from_str_radix(&offset[2..], 16).is_ok());
        }
    }
}
