//! Core types for hookline.
//!
//! This crate provides the dynamic [`Variant`] value that plugins use to
//! exchange data without compile-time knowledge of each other, the
//! non-owning host references a variant can carry, and the configuration
//! shared by every registry.

mod config;
mod error;
mod host;
mod json;
mod variant;

pub use config::{DEFAULT_INIT_DESCRIPTION, INIT_HOOK, RegistryConfig, RegistryConfigBuilder};
pub use error::CoreError;
pub use host::{HostEntity, HostRef, ObjectRef, TypeRef};
pub use variant::{Kind, Payload, Variant};
