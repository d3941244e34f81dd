//! Lookups against a [`MimeRegistry`] by extension, filename, URI and type name.
//!
//! An unknown extension or name is an ordinary outcome and yields `None`.

use std::ops::Deref;
use std::path::Path;

use log::debug;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::mime_type::MimeType;
use crate::registry::MimeRegistry;

/// Primary-type prefix of experimental types (`x-world/...`).
pub const EXPERIMENTAL_PRIMARY_PREFIX: &str = "x-";
/// Subtype prefix of the vendor tree (`application/vnd.foo`).
pub const VENDOR_TREE_PREFIX: &str = "vnd.";
/// Subtype prefix of the personal tree (`application/prs.foo`).
pub const PERSONAL_TREE_PREFIX: &str = "prs.";

/// Result of a type-name lookup.
///
/// Registered types are borrowed from the registry. Custom types are parsed on demand,
/// owned by the caller and never added to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType<'a> {
    Registered(&'a MimeType),
    Custom(MimeType),
}

impl ResolvedType<'_> {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }

    pub fn into_owned(self) -> MimeType {
        match self {
            Self::Registered(mime) => mime.clone(),
            Self::Custom(mime) => mime,
        }
    }
}

impl Deref for ResolvedType<'_> {
    type Target = MimeType;

    fn deref(&self) -> &MimeType {
        match self {
            Self::Registered(mime) => mime,
            Self::Custom(mime) => mime,
        }
    }
}

/// Whether an unregistered type may be handed out as a custom type.
///
/// Experimental primaries (`x-...`) and the vendor and personal subtype trees are accepted;
/// standard-tree names that are simply missing from the table are not.
pub fn is_admissible_custom_type(mime: &MimeType) -> bool {
    mime.primary_type().starts_with(EXPERIMENTAL_PRIMARY_PREFIX)
        || mime.sub_type().starts_with(VENDOR_TREE_PREFIX)
        || mime.sub_type().starts_with(PERSONAL_TREE_PREFIX)
}

/// Extracts the extension of the last path segment, without the dot.
///
/// Both `/` and `\` separate segments. Returns `None` when the segment has no dot.
pub fn extension_of(filename: &str) -> Option<&str> {
    let segment = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    segment.rfind('.').map(|dot| &segment[dot + 1..])
}

impl MimeRegistry {
    /// Determines the type for a file extension. A single leading dot is ignored and the
    /// lookup is case-insensitive.
    pub fn from_extension(&self, ext: &str) -> Option<&MimeType> {
        let ext = ext.strip_prefix('.').unwrap_or(ext).to_lowercase();
        let type_name = self.type_name_for_extension(&ext)?;
        self.get(type_name)
    }

    /// Determines the type from the extension of a filename or path.
    pub fn from_filename(&self, filename: &str) -> Option<&MimeType> {
        self.from_extension(extension_of(filename)?)
    }

    pub fn from_path(&self, path: &Path) -> Option<&MimeType> {
        self.from_filename(&path.to_string_lossy())
    }

    /// Determines the type from a URI.
    ///
    /// `file:` URIs are converted to a local path first. Any other URI is resolved from
    /// the extension of its decoded path, ignoring query and fragment.
    pub fn from_uri(&self, uri: &Url) -> Option<&MimeType> {
        if uri.scheme() == "file" {
            if let Ok(path) = uri.to_file_path() {
                return self.from_path(&path);
            }
        }
        let path = percent_decode_str(uri.path()).decode_utf8_lossy();
        self.from_filename(&path)
    }

    /// Parses `uri` and resolves it with [`MimeRegistry::from_uri`]. Unparseable input
    /// yields `None`.
    pub fn from_uri_str(&self, uri: &str) -> Option<&MimeType> {
        match Url::parse(uri) {
            Ok(url) => self.from_uri(&url),
            Err(e) => {
                debug!("Cannot resolve MIME type for {:?}: {}", uri, e);
                None
            }
        }
    }

    /// Looks up a type by name, falling back to an unregistered custom type for
    /// experimental, vendor and personal names.
    pub fn from_type_name(&self, type_name: &str) -> Option<ResolvedType<'_>> {
        if let Some(known) = self.get(type_name) {
            return Some(ResolvedType::Registered(known));
        }

        match MimeType::parse(type_name) {
            Ok(custom) if is_admissible_custom_type(&custom) => Some(ResolvedType::Custom(custom)),
            Ok(_) => None,
            Err(e) => {
                debug!("Cannot resolve MIME type: {}", e);
                None
            }
        }
    }
}
