//! secpol Policy Mutations
//!
//! Applies exactly one append, replace or remove to a policy document and
//! validates the whole result before returning it.
//!
//! # Core Concepts
//!
//! - [`PolicyMutationService`]: Borrow, copy, mutate, validate, return
//! - [`MutationRequest`]: Operation, policy type, optional explicit name, entry
//! - [`PolicyValidator`]: Validation seam; closures implement it
//! - [`SchemaValidator`]: Default validator over the embedded JSON schema
//!
//! # Example
//!
//! ```rust,ignore
//! use secpol_mutation::{MutationRequest, PolicyMutationService, SchemaValidator};
//!
//! let service = PolicyMutationService::new(SchemaValidator::new()?);
//! let updated = service.mutate(&document, &MutationRequest::append(policy_type, entry))?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod schema;
mod service;
mod validator;

pub use error::{MutationError, ValidationDetail};
pub use schema::SchemaValidator;
pub use service::{MutationRequest, Operation, PolicyMutationService};
pub use validator::{NoopValidator, PolicyValidator};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
