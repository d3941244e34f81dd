//! MIME type values
//!
//! A [`MimeType`] is the parsed `primary/sub[+suffix]` structure of a media type together
//! with the file extensions known for it. Registered instances are owned by a
//! [`MimeRegistry`](crate::registry::MimeRegistry); everything else is a transient value
//! owned by the caller.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MimeError, MimeResult};

/// Grammar of a MIME type name: `primary/sub` with an optional ASCII word `+suffix`.
pub const MIME_TYPE_PATTERN: &str =
    r"^(?P<primary>[-a-z]+?)/(?P<sub>[-.a-z0-9*]+?)(?:\+(?P<suffix>(?-u:\w)+))?$";

/// Marker used for the universal type and for subtype wildcards.
pub const WILDCARD: &str = "*";

static MIME_TYPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(MIME_TYPE_PATTERN).expect("MIME_TYPE_PATTERN is a valid regular expression")
});

static MIME_WILDCARD: Lazy<MimeType> = Lazy::new(MimeType::universal);

static MIME_IMAGE: Lazy<MimeType> = Lazy::new(|| MimeType {
    primary_type: "image".to_string(),
    sub_type: WILDCARD.to_string(),
    suffix: None,
    extensions: Vec::new(),
});

#[derive(Debug, Clone)]
pub struct MimeType {
    primary_type: String,
    sub_type: String,
    suffix: Option<String>,
    extensions: Vec<String>,
}

impl MimeType {
    /// Parses a type name without any extensions attached.
    ///
    /// `"*"` yields the universal wildcard; anything else must match
    /// [`MIME_TYPE_PATTERN`] exactly (the grammar is case-sensitive).
    pub fn parse(type_name: &str) -> MimeResult<Self> {
        Self::with_extensions(type_name, Vec::new())
    }

    pub(crate) fn with_extensions(type_name: &str, extensions: Vec<String>) -> MimeResult<Self> {
        if type_name == WILDCARD {
            return Ok(Self::universal());
        }

        let caps = MIME_TYPE_REGEX
            .captures(type_name)
            .ok_or_else(|| MimeError::InvalidTypeName(type_name.to_string()))?;

        Ok(Self {
            primary_type: caps["primary"].to_string(),
            sub_type: caps["sub"].to_string(),
            suffix: caps.name("suffix").map(|m| m.as_str().to_string()),
            extensions,
        })
    }

    /// Checks a type name against the grammar without building a value.
    pub fn is_valid_type_name(type_name: &str) -> bool {
        type_name == WILDCARD || MIME_TYPE_REGEX.is_match(type_name)
    }

    fn universal() -> Self {
        Self {
            primary_type: WILDCARD.to_string(),
            sub_type: WILDCARD.to_string(),
            suffix: None,
            extensions: Vec::new(),
        }
    }

    /// The universal type `*`, which matches every other type.
    pub fn wildcard() -> &'static MimeType {
        &MIME_WILDCARD
    }

    /// `image/*`, matching any image type.
    pub fn image_wildcard() -> &'static MimeType {
        &MIME_IMAGE
    }

    /// Gets the canonical type name (e.g. "application/json").
    ///
    /// The universal type is named `*`, so the name always parses back to an equal value.
    pub fn type_name(&self) -> String {
        self.to_string()
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Gets the known file extensions, preferred extension first.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// The extension to use when writing a file of this type.
    pub fn preferred_extension(&self) -> Option<&str> {
        self.extensions.first().map(String::as_str)
    }

    pub(crate) fn set_extensions(&mut self, extensions: Vec<String>) {
        self.extensions = extensions;
    }

    /// True for the universal type `*`.
    pub fn is_wildcard(&self) -> bool {
        self.primary_type == WILDCARD && self.sub_type == WILDCARD
    }

    /// True if the subtype is `*` (this includes the universal type).
    pub fn has_wildcard_subtype(&self) -> bool {
        self.sub_type == WILDCARD
    }

    /// Checks whether two types are compatible.
    ///
    /// The universal type matches everything, `image/*` matches every `image/...` type and
    /// otherwise the canonical names must be equal. The relation is symmetric but not
    /// transitive: `image/*` matches both `image/png` and `image/gif`, which do not match
    /// each other.
    pub fn matches(&self, other: &MimeType) -> bool {
        if self.is_wildcard() || other.is_wildcard() {
            return true;
        }
        if (self.has_wildcard_subtype() || other.has_wildcard_subtype())
            && self.primary_type == other.primary_type
        {
            return true;
        }
        std::ptr::eq(self, other) || self == other
    }
}

impl PartialEq for MimeType {
    fn eq(&self, other: &Self) -> bool {
        self.primary_type == other.primary_type
            && self.sub_type == other.sub_type
            && self.suffix == other.suffix
    }
}

impl Eq for MimeType {}

impl Hash for MimeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.primary_type.hash(state);
        self.sub_type.hash(state);
        self.suffix.hash(state);
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard() {
            return f.write_str(WILDCARD);
        }
        write!(f, "{}/{}", self.primary_type, self.sub_type)?;
        if let Some(suffix) = &self.suffix {
            write!(f, "+{}", suffix)?;
        }
        Ok(())
    }
}

impl FromStr for MimeType {
    type Err = MimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MimeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MimeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        MimeType::parse(&name).map_err(serde::de::Error::custom)
    }
}
