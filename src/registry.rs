//! MIME type registry
//!
//! The registry is built once from a `mime.types` style dataset: one type per line,
//! optionally followed by a tab and a space-separated list of extensions. Type names are
//! lowercased before parsing. Lines commented out with `"# "` that still carry a valid type
//! name are recovered; `#type` without the space stays commented out.
//!
//! After parsing, a fixed set of overrides adjusts the extension order of a few common types.
//! Overridden entries move to the end of the table so their extensions win when the reverse
//! (extension -> type) index is derived.

use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, trace, warn};
use once_cell::sync::OnceCell;

use crate::error::{MimeError, MimeResult};
use crate::mime_type::MimeType;

/// The bundled type table.
pub const BUNDLED_MIME_TYPES: &str = include_str!("../data/mime.types");

/// Prefix of commented-out lines that may still carry a type.
const COMMENT_PREFIX: &str = "# ";

static GLOBAL_REGISTRY: OnceCell<MimeRegistry> = OnceCell::new();

/// Adjustment applied to a registered type after the dataset has been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionOverride {
    /// Replaces the type's extension list.
    Replace { type_name: String, extensions: Vec<String> },
    /// Appends extensions to the type's existing list.
    Append { type_name: String, extensions: Vec<String> },
}

impl ExtensionOverride {
    pub fn type_name(&self) -> &str {
        match self {
            Self::Replace { type_name, .. } | Self::Append { type_name, .. } => type_name,
        }
    }
}

fn default_overrides() -> Vec<ExtensionOverride> {
    vec![
        ExtensionOverride::Replace {
            type_name: "image/jpeg".to_string(),
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "jpe".to_string()],
        },
        ExtensionOverride::Replace {
            type_name: "image/tiff".to_string(),
            extensions: vec!["tif".to_string(), "tiff".to_string()],
        },
        ExtensionOverride::Append {
            type_name: "application/xml".to_string(),
            extensions: vec!["ent".to_string()],
        },
    ]
}

#[derive(Debug, Clone)]
enum DatasetSource {
    Bundled,
    Text(String),
    File(PathBuf),
}

/// Builds a [`MimeRegistry`] from a dataset and a list of overrides.
///
/// The default builder reads the bundled dataset and carries the stock overrides
/// (`image/jpeg`, `image/tiff`, `application/xml`).
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    source: DatasetSource,
    overrides: Vec<ExtensionOverride>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            source: DatasetSource::Bundled,
            overrides: default_overrides(),
        }
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given dataset text instead of the bundled table.
    pub fn dataset(mut self, text: impl Into<String>) -> Self {
        self.source = DatasetSource::Text(text.into());
        self
    }

    /// Reads the dataset from a file when the registry is built.
    pub fn dataset_file(mut self, path: impl AsRef<Path>) -> Self {
        self.source = DatasetSource::File(path.as_ref().to_path_buf());
        self
    }

    /// Reads the whole dataset from a reader right away.
    pub fn dataset_reader<R: BufRead>(mut self, reader: R) -> MimeResult<Self> {
        let mut text = String::new();
        for line in reader.lines() {
            let line =
                line.map_err(|e| MimeError::init_io("failed to read MIME type dataset", e))?;
            text.push_str(&line);
            text.push('\n');
        }
        self.source = DatasetSource::Text(text);
        Ok(self)
    }

    /// Drops every override, including the stock ones.
    pub fn clear_overrides(mut self) -> Self {
        self.overrides.clear();
        self
    }

    pub fn replace_extensions<I, S>(mut self, type_name: &str, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides.push(ExtensionOverride::Replace {
            type_name: type_name.to_string(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn append_extensions<I, S>(mut self, type_name: &str, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides.push(ExtensionOverride::Append {
            type_name: type_name.to_string(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn overrides(&self) -> &[ExtensionOverride] {
        &self.overrides
    }

    pub fn build(&self) -> MimeResult<MimeRegistry> {
        match &self.source {
            DatasetSource::Bundled => self.build_from(BUNDLED_MIME_TYPES),
            DatasetSource::Text(text) => self.build_from(text),
            DatasetSource::File(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    MimeError::init_io(format!("failed to read {}", path.display()), e)
                })?;
                self.build_from(&text)
            }
        }
    }

    fn build_from(&self, text: &str) -> MimeResult<MimeRegistry> {
        let mut types = parse_dataset(text);
        if types.is_empty() {
            return Err(MimeError::init("dataset contains no valid MIME types"));
        }

        for entry in &self.overrides {
            apply_override(&mut types, entry);
        }

        let mut extensions = IndexMap::new();
        for (type_name, mime) in &types {
            for ext in mime.extensions() {
                extensions.insert(ext.clone(), type_name.clone());
            }
        }

        debug!(
            "Built MIME registry with {} types and {} extensions",
            types.len(),
            extensions.len()
        );

        Ok(MimeRegistry { types, extensions })
    }
}

/// Returns the line with a leading `"# "` removed, if its first token is a valid type name
/// once lowercased.
fn recover_line(line: &str) -> Option<&str> {
    let line = line.strip_prefix(COMMENT_PREFIX).unwrap_or(line);
    let first = line.split_whitespace().next()?;
    if MimeType::is_valid_type_name(&first.to_lowercase()) {
        Some(line)
    } else {
        None
    }
}

fn parse_dataset(text: &str) -> IndexMap<String, MimeType> {
    let mut types = IndexMap::new();
    let mut bare = Vec::new();

    for raw in text.lines() {
        let Some(line) = recover_line(raw) else {
            trace!("Skipping MIME dataset line: {:?}", raw);
            continue;
        };

        if !line.contains('\t') {
            bare.extend(line.split_whitespace().next().map(str::to_lowercase));
            continue;
        }

        let (name, exts) = line.split_once('\t').unwrap_or((line, ""));
        let extensions = exts.split_whitespace().map(str::to_lowercase).collect();

        match MimeType::with_extensions(&name.trim().to_lowercase(), extensions) {
            Ok(mime) => {
                types.insert(mime.type_name(), mime);
            }
            Err(e) => trace!("Dropping MIME dataset line: {}", e),
        }
    }

    for name in bare {
        match MimeType::parse(&name) {
            Ok(mime) => {
                types.insert(mime.type_name(), mime);
            }
            Err(e) => trace!("Dropping MIME dataset line: {}", e),
        }
    }

    types
}

fn apply_override(types: &mut IndexMap<String, MimeType>, entry: &ExtensionOverride) {
    let Some(mut mime) = types.shift_remove(entry.type_name()) else {
        warn!("Skipping extension override for unknown type {}", entry.type_name());
        return;
    };

    let extensions = match entry {
        ExtensionOverride::Replace { extensions, .. } => extensions.clone(),
        ExtensionOverride::Append { extensions, .. } => {
            let mut merged = mime.extensions().to_vec();
            merged.extend(extensions.iter().cloned());
            merged
        }
    };
    mime.set_extensions(extensions);
    types.insert(mime.type_name(), mime);
}

/// Table of known MIME types and the reverse extension index.
///
/// Immutable once built; share it by reference or behind an `Arc`.
#[derive(Debug, Clone)]
pub struct MimeRegistry {
    types: IndexMap<String, MimeType>,
    extensions: IndexMap<String, String>,
}

impl MimeRegistry {
    /// Builds a registry from the bundled dataset with the stock overrides.
    pub fn bundled() -> MimeResult<Self> {
        RegistryBuilder::default().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Returns the process-wide registry, building it on first use.
    pub fn global() -> MimeResult<&'static MimeRegistry> {
        GLOBAL_REGISTRY.get_or_try_init(Self::bundled)
    }

    /// Looks up a registered type by its canonical name.
    pub fn get(&self, type_name: &str) -> Option<&MimeType> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Canonical name registered for an already normalized extension.
    pub fn type_name_for_extension(&self, extension: &str) -> Option<&str> {
        self.extensions.get(extension).map(String::as_str)
    }

    /// Iterates registered types in table order.
    pub fn iter(&self) -> impl Iterator<Item = &MimeType> {
        self.types.values()
    }

    /// Iterates the extension index in table order.
    pub fn extension_mappings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extensions.iter().map(|(e, t)| (e.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn application_json(&self) -> Option<&MimeType> {
        self.get("application/json")
    }

    pub fn application_xml(&self) -> Option<&MimeType> {
        self.get("application/xml")
    }

    pub fn image_jpeg(&self) -> Option<&MimeType> {
        self.get("image/jpeg")
    }

    pub fn image_tiff(&self) -> Option<&MimeType> {
        self.get("image/tiff")
    }

    pub fn image_png(&self) -> Option<&MimeType> {
        self.get("image/png")
    }
}
