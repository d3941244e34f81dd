//! Resources and the service that creates, locates, reads and writes them.
//!
//! The service resolves a resource's MIME type from its filename extension and asks the
//! persistence handlers where it lives. Only `file:` URIs can be read or written; other
//! schemes are located but never fetched.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use tokio::fs;
use tokio::io::AsyncRead;
use url::Url;

use crate::config::ServiceConfig;
use crate::error::{ResourceError, ResourceErrorKind, ResourceResult};
use crate::mime_type::MimeType;
use crate::persistence::{
    CustomResourcePersistenceTypeHandler, HandlerRegistry, ManagedResourcePersistenceTypeHandler,
    ResourcePersistenceType,
};
use crate::registry::MimeRegistry;

/// Readable byte stream of a resource.
pub type InputStream = Box<dyn AsyncRead + Send + Unpin>;

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    uri: Url,
    mime_type: MimeType,
    persistence_type: ResourcePersistenceType,
    size: Option<u64>,
}

impl Resource {
    pub fn new(uri: Url, mime_type: MimeType, persistence_type: ResourcePersistenceType) -> Self {
        Self {
            uri,
            mime_type,
            persistence_type,
            size: None,
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    pub fn persistence_type(&self) -> ResourcePersistenceType {
        self.persistence_type
    }

    /// Size in bytes, known once the resource has been found on disk.
    pub fn size(&self) -> Option<u64> {
        self.size
    }
}

#[async_trait]
pub trait ResourceService: Send + Sync {
    /// Prepares a new resource for `key`. Nothing is written until [`ResourceService::write`].
    async fn create(
        &self,
        key: &str,
        persistence_type: ResourcePersistenceType,
        filename_extension: &str,
    ) -> ResourceResult<Resource>;

    /// Locates an existing resource for `key`.
    async fn get(
        &self,
        key: &str,
        persistence_type: ResourcePersistenceType,
        filename_extension: &str,
    ) -> ResourceResult<Resource>;

    async fn input_stream(&self, resource: &Resource) -> ResourceResult<InputStream>;

    async fn input_stream_for_uri(&self, uri: &Url) -> ResourceResult<InputStream>;

    /// Replaces the resource's contents with `output`.
    async fn write(&self, resource: &Resource, output: &str) -> ResourceResult<()>;
}

/// Resource service over the local filesystem.
#[derive(Debug, Clone)]
pub struct FileResourceService {
    registry: Arc<MimeRegistry>,
    handlers: HandlerRegistry,
}

impl FileResourceService {
    pub fn new(registry: Arc<MimeRegistry>, handlers: HandlerRegistry) -> Self {
        Self { registry, handlers }
    }

    /// Service over the bundled registry with managed and custom handlers.
    pub fn from_config(config: &ServiceConfig) -> ResourceResult<Self> {
        let registry = Arc::new(MimeRegistry::bundled()?);
        let handlers = HandlerRegistry::new()
            .with_handler(Arc::new(ManagedResourcePersistenceTypeHandler::new(
                config.storage_root(),
            )))
            .with_handler(Arc::new(CustomResourcePersistenceTypeHandler::new()));
        Ok(Self::new(registry, handlers))
    }

    pub fn registry(&self) -> &MimeRegistry {
        &self.registry
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    fn mime_for_extension(&self, filename_extension: &str) -> ResourceResult<MimeType> {
        self.registry
            .from_extension(filename_extension)
            .cloned()
            .ok_or_else(|| {
                ResourceError::new(
                    ResourceErrorKind::InvalidArg,
                    format!("Unknown filename extension: {}", filename_extension),
                )
            })
    }

    fn candidates(
        &self,
        key: &str,
        persistence_type: ResourcePersistenceType,
        mime_type: &MimeType,
    ) -> ResourceResult<Vec<Url>> {
        let uris = self.handlers.uris(persistence_type, key, mime_type)?;
        if uris.is_empty() {
            return Err(ResourceError::new(
                ResourceErrorKind::NotFound,
                format!("No location for {} resource {}", persistence_type, key),
            ));
        }
        Ok(uris)
    }
}

fn local_path(uri: &Url) -> ResourceResult<PathBuf> {
    if uri.scheme() != "file" {
        return Err(ResourceError::new(
            ResourceErrorKind::NotSupported,
            format!("Unsupported URI scheme: {}", uri.scheme()),
        ));
    }
    uri.to_file_path().map_err(|_| {
        ResourceError::new(
            ResourceErrorKind::InvalidArg,
            format!("URI does not name a local file: {}", uri),
        )
    })
}

#[async_trait]
impl ResourceService for FileResourceService {
    async fn create(
        &self,
        key: &str,
        persistence_type: ResourcePersistenceType,
        filename_extension: &str,
    ) -> ResourceResult<Resource> {
        let mime_type = self.mime_for_extension(filename_extension)?;
        let uris = self.candidates(key, persistence_type, &mime_type)?;
        let uri = uris.into_iter().next().ok_or_else(|| {
            ResourceError::new(ResourceErrorKind::NotFound, format!("No location for {}", key))
        })?;

        debug!("Created {} resource {} at {}", persistence_type, key, uri);
        Ok(Resource::new(uri, mime_type, persistence_type))
    }

    async fn get(
        &self,
        key: &str,
        persistence_type: ResourcePersistenceType,
        filename_extension: &str,
    ) -> ResourceResult<Resource> {
        let mime_type = self.mime_for_extension(filename_extension)?;

        for uri in self.candidates(key, persistence_type, &mime_type)? {
            if uri.scheme() != "file" {
                return Ok(Resource::new(uri, mime_type, persistence_type));
            }

            let path = local_path(&uri)?;
            match fs::metadata(&path).await {
                Ok(metadata) if metadata.is_file() => {
                    let mut resource = Resource::new(uri, mime_type, persistence_type);
                    resource.size = Some(metadata.len());
                    return Ok(resource);
                }
                Ok(_) => debug!("Skipping non-file candidate {}", path.display()),
                Err(e) => debug!("Skipping candidate {}: {}", path.display(), e),
            }
        }

        Err(ResourceError::new(
            ResourceErrorKind::NotFound,
            format!("No {} resource found for key {}", persistence_type, key),
        ))
    }

    async fn input_stream(&self, resource: &Resource) -> ResourceResult<InputStream> {
        self.input_stream_for_uri(resource.uri()).await
    }

    async fn input_stream_for_uri(&self, uri: &Url) -> ResourceResult<InputStream> {
        let path = local_path(uri)?;
        let file = fs::File::open(&path).await?;
        Ok(Box::new(file))
    }

    async fn write(&self, resource: &Resource, output: &str) -> ResourceResult<()> {
        let path = local_path(resource.uri())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, output).await?;
        debug!("Wrote {} bytes to {}", output.len(), path.display());
        Ok(())
    }
}
