//! Installable catalog
//!
//! A tree of labeled choice sections ending in installable operations.
//! Sections that carry a choice label own a [`ChoiceList`] handle that the
//! caller uses to append nested content; sections created without a label
//! are terminal and expose no handle, so nothing can be added beneath them.
//!
//! Installables reference images by name. Every name is checked against the
//! [`ImageRegistry`] when the installable is added, so a bad reference fails
//! at the call that introduced it.

use serde::{Deserialize, Serialize};

use crate::core::registry::ImageRegistry;
use crate::error::CatalogError;

/// Name and description shared by installables of the same kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallType {
    pub name: String,
    pub description: String,
}

impl InstallType {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// One selectable install operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Installable {
    pub name: String,
    pub description: String,

    /// Erase the whole flash before writing the images
    pub erase: bool,

    /// Image names, in flashing order
    pub images: Vec<String>,
}

/// One node of the selection tree.
///
/// Unknown keys are rejected so that a malformed installable (for example a
/// non-boolean `erase`) cannot be read back as a leaf section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ChoiceSection {
    pub name: String,
    pub description: String,

    #[serde(
        rename = "choice-name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    choice_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    choices: Option<ChoiceList>,
}

/// Entry of a [`ChoiceList`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Choice {
    Installable(Installable),
    Section(ChoiceSection),
}

/// Ordered children of a labeled section (menu order)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ChoiceList(Vec<Choice>);

impl ChoiceSection {
    /// Create a section that offers a choice labeled `choice_name`
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        choice_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            choice_name: Some(choice_name.into()),
            choices: Some(ChoiceList::default()),
        }
    }

    /// Create a terminal section (no choice label, no children)
    pub fn terminal(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            choice_name: None,
            choices: None,
        }
    }

    /// Whether this section is terminal
    pub fn is_terminal(&self) -> bool {
        self.choice_name.is_none()
    }

    /// Children of a labeled section
    pub fn choices(&self) -> Option<&ChoiceList> {
        self.choices.as_ref()
    }

    /// Mutable children handle of a labeled section
    pub fn choices_mut(&mut self) -> Option<&mut ChoiceList> {
        self.choices.as_mut()
    }

    /// Every installable in the subtree, with its slash-separated path
    pub fn installables(&self) -> Vec<(String, &Installable)> {
        let mut found = Vec::new();
        self.collect_installables(&self.name, &mut found);
        found
    }

    fn collect_installables<'a>(&'a self, path: &str, found: &mut Vec<(String, &'a Installable)>) {
        let Some(list) = &self.choices else {
            return;
        };
        for choice in list.iter() {
            match choice {
                Choice::Installable(installable) => {
                    found.push((format!("{path}/{}", installable.name), installable));
                }
                Choice::Section(section) => {
                    section.collect_installables(&format!("{path}/{}", section.name), found);
                }
            }
        }
    }

    /// Sections whose label and children disagree (a parsed manifest can
    /// carry `choices` without `choice-name` or the reverse)
    pub fn malformed_sections(&self) -> Vec<String> {
        let mut bad = Vec::new();
        if self.choice_name.is_some() != self.choices.is_some() {
            bad.push(self.name.clone());
        }
        if let Some(list) = &self.choices {
            for choice in list.iter() {
                if let Choice::Section(section) = choice {
                    bad.extend(section.malformed_sections());
                }
            }
        }
        bad
    }
}

impl ChoiceList {
    /// Append a labeled section and return the handle for its children
    pub fn add_section(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        choice_name: impl Into<String>,
    ) -> &mut ChoiceList {
        self.0.push(Choice::Section(ChoiceSection::new(
            name,
            description,
            choice_name,
        )));
        let Some(Choice::Section(section)) = self.0.last_mut() else {
            unreachable!("a section was just appended");
        };
        section.choices.get_or_insert_with(ChoiceList::default)
    }

    /// Append a terminal section
    pub fn add_terminal_section(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.0
            .push(Choice::Section(ChoiceSection::terminal(name, description)));
    }

    /// Append an installable flashing `images` in the given order.
    ///
    /// Every image must already be registered; otherwise nothing is
    /// appended and [`CatalogError::MissingImage`] names the first absent
    /// image.
    pub fn add_installable<S: AsRef<str>>(
        &mut self,
        registry: &ImageRegistry,
        install_type: &InstallType,
        erase: bool,
        images: &[S],
    ) -> Result<(), CatalogError> {
        if let Some(missing) = images.iter().find(|image| !registry.contains(image.as_ref())) {
            return Err(CatalogError::MissingImage {
                image: missing.as_ref().to_string(),
                installable: install_type.name.clone(),
            });
        }

        self.0.push(Choice::Installable(Installable {
            name: install_type.name.clone(),
            description: install_type.description.clone(),
            erase,
            images: images.iter().map(|image| image.as_ref().to_string()).collect(),
        }));
        Ok(())
    }

    /// Children in menu order
    pub fn iter(&self) -> std::slice::Iter<'_, Choice> {
        self.0.iter()
    }

    /// Child at `index`
    pub fn get(&self, index: usize) -> Option<&Choice> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
