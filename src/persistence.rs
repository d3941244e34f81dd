//! Resource persistence types and the handlers that locate resources for them.
//!
//! A handler turns a caller-supplied resolving key into an ordered list of candidate URIs.
//! Handlers are collected in a [`HandlerRegistry`] keyed by persistence type, which the
//! resource service consults for every lookup.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ResourceError, ResourceErrorKind, ResourceResult};
use crate::mime_type::MimeType;

/// Where and how a resource is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourcePersistenceType {
    /// Stored in storage owned by this service.
    Managed,
    /// Located through a resolver configured elsewhere.
    Resolved,
    /// Stored elsewhere and only referenced.
    Referenced,
    /// The resolving key itself is the URI.
    Custom,
}

impl fmt::Display for ResourcePersistenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Managed => "MANAGED",
            Self::Resolved => "RESOLVED",
            Self::Referenced => "REFERENCED",
            Self::Custom => "CUSTOM",
        };
        f.write_str(name)
    }
}

/// Trait that all persistence type handlers must implement.
pub trait ResourcePersistenceTypeHandler: Send + Sync {
    fn persistence_type(&self) -> ResourcePersistenceType;

    /// Candidate URIs for `resolving_key`, most preferred first.
    fn uris(&self, resolving_key: &str, mime_type: &MimeType) -> ResourceResult<Vec<Url>>;
}

/// Treats the resolving key as the resource URI.
#[derive(Debug, Default)]
pub struct CustomResourcePersistenceTypeHandler;

impl CustomResourcePersistenceTypeHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ResourcePersistenceTypeHandler for CustomResourcePersistenceTypeHandler {
    fn persistence_type(&self) -> ResourcePersistenceType {
        ResourcePersistenceType::Custom
    }

    fn uris(&self, resolving_key: &str, _mime_type: &MimeType) -> ResourceResult<Vec<Url>> {
        let uri = Url::parse(resolving_key).map_err(|e| {
            ResourceError::with_source(
                ResourceErrorKind::InvalidArg,
                format!("Resolving key is not a URI: {}", resolving_key),
                Box::new(e),
            )
        })?;
        Ok(vec![uri])
    }
}

/// Stores resources below a root directory.
///
/// The first 16 alphanumeric characters of the key are split into four-character folders,
/// so `a1b2c3d4e5f6a7b8-x` with `image/png` lands at
/// `{root}/a1b2/c3d4/e5f6/a7b8/a1b2c3d4e5f6a7b8-x.png`.
#[derive(Debug, Clone)]
pub struct ManagedResourcePersistenceTypeHandler {
    root: PathBuf,
}

impl ManagedResourcePersistenceTypeHandler {
    const FOLDER_WIDTH: usize = 4;
    const FOLDER_DEPTH: usize = 4;

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn path_for(&self, key: &str, mime_type: &MimeType) -> ResourceResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(ResourceError::new(
                ResourceErrorKind::InvalidArg,
                format!("Invalid managed resource key: {:?}", key),
            ));
        }

        let folder_chars: Vec<char> = key
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(Self::FOLDER_WIDTH * Self::FOLDER_DEPTH)
            .collect();

        let mut path = self.root.clone();
        for chunk in folder_chars.chunks(Self::FOLDER_WIDTH) {
            path.push(chunk.iter().collect::<String>());
        }

        let filename = match mime_type.preferred_extension() {
            Some(ext) => format!("{}.{}", key, ext),
            None => key.to_string(),
        };
        path.push(filename);
        Ok(path)
    }
}

impl ResourcePersistenceTypeHandler for ManagedResourcePersistenceTypeHandler {
    fn persistence_type(&self) -> ResourcePersistenceType {
        ResourcePersistenceType::Managed
    }

    fn uris(&self, resolving_key: &str, mime_type: &MimeType) -> ResourceResult<Vec<Url>> {
        let path = self.path_for(resolving_key, mime_type)?;
        let uri = Url::from_file_path(&path).map_err(|_| {
            ResourceError::new(
                ResourceErrorKind::InvalidArg,
                format!("Managed storage path is not absolute: {}", path.display()),
            )
        })?;
        Ok(vec![uri])
    }
}

/// Handlers keyed by the persistence type they serve.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<ResourcePersistenceType, Arc<dyn ResourcePersistenceTypeHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, replacing any handler for the same persistence type.
    pub fn register(&mut self, handler: Arc<dyn ResourcePersistenceTypeHandler>) {
        self.handlers.insert(handler.persistence_type(), handler);
    }

    pub fn with_handler(mut self, handler: Arc<dyn ResourcePersistenceTypeHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn get(
        &self,
        persistence_type: ResourcePersistenceType,
    ) -> Option<Arc<dyn ResourcePersistenceTypeHandler>> {
        self.handlers.get(&persistence_type).cloned()
    }

    /// Delegates to the handler registered for `persistence_type`.
    pub fn uris(
        &self,
        persistence_type: ResourcePersistenceType,
        resolving_key: &str,
        mime_type: &MimeType,
    ) -> ResourceResult<Vec<Url>> {
        let handler = self.get(persistence_type).ok_or_else(|| {
            ResourceError::new(
                ResourceErrorKind::NotSupported,
                format!("No handler registered for persistence type: {}", persistence_type),
            )
        })?;
        handler.uris(resolving_key, mime_type)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("persistence_types", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
