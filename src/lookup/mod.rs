//! Postal code lookup client (ViaCEP)

mod client;
mod traits;

pub use client::{LookupError, ViaCepClient, DEFAULT_BASE_URL};
pub use traits::PostalLookup;

#[cfg(test)]
pub use traits::MockPostalLookup;
