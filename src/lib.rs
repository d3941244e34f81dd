//! # mimereg - MIME type registry
//!
//! A table of MIME types and their file extensions, with lookups by extension, filename,
//! URI and type name, and a wildcard-aware compatibility check.
//!
//! ## Overview
//!
//! The registry is built once from the bundled `mime.types` dataset and is read-only
//! afterwards. Every lookup takes the registry explicitly, so tests and embedders can build
//! their own tables; [`MimeRegistry::global`] hands out a process-wide instance built on
//! first use.
//!
//! ## Core Concepts
//!
//! - **MimeType**: parsed `primary/sub[+suffix]` with the type's known extensions
//! - **MimeRegistry**: canonical name -> type, and extension -> canonical name
//! - **Matching**: `*` matches everything, `image/*` matches every image type
//! - **Persistence handlers**: turn a resolving key into candidate URIs
//! - **ResourceService**: create, locate, read and write resources by key and extension
//!
//! ## Example
//!
//! ```no_run
//! use mimereg::{MimeRegistry, MimeType};
//!
//! # fn example() -> mimereg::MimeResult<()> {
//! let registry = MimeRegistry::global()?;
//!
//! let jpeg = registry.from_filename("holiday.JPG").expect("jpg is registered");
//! assert_eq!(jpeg.type_name(), "image/jpeg");
//! assert_eq!(jpeg.extensions(), ["jpg", "jpeg", "jpe"]);
//!
//! let any_image = MimeType::parse("image/*")?;
//! assert!(any_image.matches(jpeg));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod mime_type;
pub mod persistence;
pub mod registry;
pub mod resolve;
pub mod resource;

pub use config::ServiceConfig;
pub use error::{MimeError, MimeResult, ResourceError, ResourceErrorKind, ResourceResult};
pub use mime_type::{MimeType, MIME_TYPE_PATTERN, WILDCARD};
pub use persistence::{
    CustomResourcePersistenceTypeHandler, HandlerRegistry, ManagedResourcePersistenceTypeHandler,
    ResourcePersistenceType, ResourcePersistenceTypeHandler,
};
pub use registry::{ExtensionOverride, MimeRegistry, RegistryBuilder, BUNDLED_MIME_TYPES};
pub use resolve::{extension_of, is_admissible_custom_type, ResolvedType};
pub use resource::{FileResourceService, InputStream, Resource, ResourceService};
