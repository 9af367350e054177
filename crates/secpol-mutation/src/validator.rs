//! Document validation seam
//!
//! The mutation service validates every candidate document before handing
//! it back. Any `Fn(PolicyType, &PolicyDocument) -> Result<(), Vec<ValidationDetail>>`
//! is a validator, which keeps test doubles to a closure.

use crate::error::ValidationDetail;
use secpol_document::{PolicyDocument, PolicyType};

/// Validates a whole policy document
pub trait PolicyValidator {
    /// Validate `document` after a mutation of `policy_type`
    ///
    /// # Errors
    /// Returns every violation found; an empty list is never returned as an error.
    fn validate(&self, policy_type: PolicyType, document: &PolicyDocument) -> Result<(), Vec<ValidationDetail>>;
}

impl<F> PolicyValidator for F
where
    F: Fn(PolicyType, &PolicyDocument) -> Result<(), Vec<ValidationDetail>>,
{
    fn validate(&self, policy_type: PolicyType, document: &PolicyDocument) -> Result<(), Vec<ValidationDetail>> {
        self(policy_type, document)
    }
}

/// Accepts every document
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopValidator;

impl PolicyValidator for NoopValidator {
    fn validate(&self, _: PolicyType, _: &PolicyDocument) -> Result<(), Vec<ValidationDetail>> {
        Ok(())
    }
}
