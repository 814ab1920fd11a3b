//! Form domain layer
//!
//! Field values, the validation schema, and the postal code autofill for
//! the club and sponsor registration forms.

mod autofill;
mod field;
mod form_state;
mod postal_code;
mod schema;

pub use autofill::{
    AddressRecord, AutofillOutcome, LookupCompletion, LookupRequest, OrderingPolicy,
};
pub use field::{FieldValue, FormField};
pub use form_state::{FieldValueStore, FormKind, Record, RegistrationForm};
pub use postal_code::NormalizedPostalCode;
