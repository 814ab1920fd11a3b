//! Trait abstraction for the postal lookup to enable mocking in tests

use super::LookupError;
use crate::state::forms::{AddressRecord, NormalizedPostalCode};
use async_trait::async_trait;

/// Maps a postal code to an address
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostalLookup: Send + Sync {
    /// Look up the address of a complete postal code
    async fn lookup(&self, code: &NormalizedPostalCode) -> Result<AddressRecord, LookupError>;
}
