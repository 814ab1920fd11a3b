//! Address autofill driven by the postal code field
//!
//! When focus leaves the postal code field the controller normalizes the raw
//! value and, for a complete 8-digit code, issues a ticketed lookup request.
//! The lookup itself runs elsewhere (see `App::start_lookup`); its completion
//! comes back through [`AutofillController::apply`], which is the only place
//! that writes the dependent address fields.

use super::form_state::{FieldValueStore, FormId};
use super::postal_code::NormalizedPostalCode;
use crate::lookup::LookupError;
use serde::{Deserialize, Serialize};

/// Address returned by the postal lookup service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressRecord {
    pub city: String,
    pub neighborhood: String,
    pub street: String,
    pub state_code: String,
}

/// Names of the fields the autofill reads and writes for one form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressFields {
    pub postal_code: &'static str,
    pub city: &'static str,
    pub neighborhood: &'static str,
    pub street: &'static str,
    pub state: &'static str,
}

impl AddressFields {
    fn assignments<'a>(&self, address: &'a AddressRecord) -> [(&'static str, &'a str); 4] {
        [
            (self.city, address.city.as_str()),
            (self.neighborhood, address.neighborhood.as_str()),
            (self.street, address.street.as_str()),
            (self.state, address.state_code.as_str()),
        ]
    }
}

/// Which completion wins when several lookups overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Only the most recently issued lookup may write the fields
    #[default]
    LatestIssued,
    /// Every successful completion writes the fields, last arrival wins
    Arrival,
}

/// Sequence number of a lookup within one form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LookupTicket(pub u64);

/// A lookup the controller wants performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub form: FormId,
    pub ticket: LookupTicket,
    pub code: NormalizedPostalCode,
}

/// Result of a performed lookup, delivered back to the UI loop
#[derive(Debug)]
pub struct LookupCompletion {
    pub form: FormId,
    pub ticket: LookupTicket,
    pub code: NormalizedPostalCode,
    pub result: Result<AddressRecord, LookupError>,
}

impl LookupCompletion {
    pub fn new(request: LookupRequest, result: Result<AddressRecord, LookupError>) -> Self {
        Self {
            form: request.form,
            ticket: request.ticket,
            code: request.code,
            result,
        }
    }
}

/// What applying a completion did to the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutofillOutcome {
    /// The four address fields were overwritten
    Applied(AddressRecord),
    /// A newer lookup was issued after this one; nothing was written
    Superseded,
    /// The lookup failed; nothing was written. Carries the status bar text.
    Failed(&'static str),
}

/// Per-form autofill state
#[derive(Debug, Clone)]
pub struct AutofillController {
    form: FormId,
    fields: AddressFields,
    policy: OrderingPolicy,
    last_issued: LookupTicket,
    latest_pending: bool,
}

impl AutofillController {
    pub fn new(form: FormId, fields: AddressFields, policy: OrderingPolicy) -> Self {
        Self {
            form,
            fields,
            policy,
            last_issued: LookupTicket::default(),
            latest_pending: false,
        }
    }

    /// Whether the most recently issued lookup has not completed yet
    pub fn in_flight(&self) -> bool {
        self.latest_pending
    }

    fn issue_ticket(&mut self) -> LookupTicket {
        self.last_issued = LookupTicket(self.last_issued.0 + 1);
        self.last_issued
    }

    /// Handle focus leaving the postal code field.
    ///
    /// Returns the lookup to perform, or `None` when the value does not
    /// normalize to a complete postal code.
    pub fn on_blur(&mut self, raw: &str) -> Option<LookupRequest> {
        let Some(code) = NormalizedPostalCode::parse(raw) else {
            tracing::trace!(
                digits = NormalizedPostalCode::normalize(raw).len(),
                "postal code incomplete, skipping lookup"
            );
            // The field no longer holds the code of any pending lookup
            if self.policy == OrderingPolicy::LatestIssued {
                self.invalidate();
            }
            return None;
        };
        let ticket = self.issue_ticket();
        self.latest_pending = true;
        tracing::debug!(%code, ticket = ticket.0, "issuing postal lookup");
        Some(LookupRequest {
            form: self.form,
            ticket,
            code,
        })
    }

    /// Make every lookup issued so far stale (used when the form is reset)
    pub fn invalidate(&mut self) {
        self.issue_ticket();
        self.latest_pending = false;
    }

    /// Apply a finished lookup to the form's fields
    pub fn apply(
        &mut self,
        completion: LookupCompletion,
        store: &mut dyn FieldValueStore,
    ) -> AutofillOutcome {
        let is_latest = completion.ticket == self.last_issued;
        if is_latest {
            self.latest_pending = false;
        }

        if self.policy == OrderingPolicy::LatestIssued && !is_latest {
            tracing::debug!(
                code = %completion.code,
                ticket = completion.ticket.0,
                latest = self.last_issued.0,
                "discarding superseded postal lookup"
            );
            return AutofillOutcome::Superseded;
        }

        match completion.result {
            Ok(address) => {
                for (name, value) in self.fields.assignments(&address) {
                    if !store.set_value(name, value) {
                        tracing::warn!(field = name, "autofill target field missing");
                    }
                }
                tracing::info!(code = %completion.code, "address autofilled");
                AutofillOutcome::Applied(address)
            }
            Err(err) => {
                tracing::warn!(code = %completion.code, error = %err, "postal lookup failed");
                AutofillOutcome::Failed(err.user_message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::Record;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const CLUB_FIELDS: AddressFields = AddressFields {
        postal_code: "zipCode",
        city: "city",
        neighborhood: "neighborhood",
        street: "street",
        state: "state",
    };

    #[derive(Default)]
    struct Values(HashMap<String, String>);

    impl Values {
        fn seeded() -> Self {
            let mut values = Self::default();
            for (k, v) in [
                ("city", "typed city"),
                ("neighborhood", "typed hood"),
                ("street", "typed street"),
                ("state", "XX"),
            ] {
                values.0.insert(k.to_string(), v.to_string());
            }
            values
        }

        fn get(&self, name: &str) -> &str {
            self.0.get(name).map(String::as_str).unwrap_or("")
        }
    }

    impl FieldValueStore for Values {
        fn value(&self, name: &str) -> Option<String> {
            self.0.get(name).cloned()
        }
        fn set_value(&mut self, name: &str, value: &str) -> bool {
            self.0.insert(name.to_string(), value.to_string());
            true
        }
        fn all_values(&self) -> Record {
            Record::new()
        }
    }

    fn controller(policy: OrderingPolicy) -> AutofillController {
        AutofillController::new(FormId(7), CLUB_FIELDS, policy)
    }

    fn address(city: &str, neighborhood: &str, street: &str, state: &str) -> AddressRecord {
        AddressRecord {
            city: city.to_string(),
            neighborhood: neighborhood.to_string(),
            street: street.to_string(),
            state_code: state.to_string(),
        }
    }

    fn sao_paulo() -> AddressRecord {
        address("São Paulo", "Sé", "Praça da Sé", "SP")
    }

    fn rio() -> AddressRecord {
        address("Rio de Janeiro", "Centro", "Rua X", "RJ")
    }

    #[test]
    fn test_incomplete_codes_issue_no_lookup() {
        let mut autofill = controller(OrderingPolicy::LatestIssued);
        for raw in ["", "123", "0100-100", "01001-0000", "cep"] {
            assert!(autofill.on_blur(raw).is_none(), "lookup issued for {raw:?}");
        }
        assert!(!autofill.in_flight());
    }

    #[test]
    fn test_masked_code_issues_one_normalized_lookup() {
        let mut autofill = controller(OrderingPolicy::LatestIssued);
        let request = autofill.on_blur("01001-000").unwrap();
        assert_eq!(request.code.as_str(), "01001000");
        assert_eq!(request.ticket, LookupTicket(1));
        assert_eq!(request.form, FormId(7));
        assert!(autofill.in_flight());
    }

    #[test]
    fn test_incomplete_code_retires_pending_lookup() {
        let mut autofill = controller(OrderingPolicy::LatestIssued);
        let mut values = Values::seeded();
        let request = autofill.on_blur("01001-000").unwrap();
        assert!(autofill.on_blur("123").is_none());
        assert!(!autofill.in_flight());

        let outcome = autofill.apply(LookupCompletion::new(request, Ok(sao_paulo())), &mut values);

        assert_eq!(outcome, AutofillOutcome::Superseded);
        assert_eq!(values.get("city"), "typed city");
        assert_eq!(values.get("street"), "typed street");
    }

    #[test]
    fn test_success_overwrites_all_four_fields() {
        let mut autofill = controller(OrderingPolicy::LatestIssued);
        let mut values = Values::seeded();
        let request = autofill.on_blur("01001-000").unwrap();

        let outcome = autofill.apply(LookupCompletion::new(request, Ok(sao_paulo())), &mut values);

        assert_eq!(outcome, AutofillOutcome::Applied(sao_paulo()));
        assert_eq!(values.get("city"), "São Paulo");
        assert_eq!(values.get("neighborhood"), "Sé");
        assert_eq!(values.get("street"), "Praça da Sé");
        assert_eq!(values.get("state"), "SP");
        assert!(!autofill.in_flight());
    }

    #[test]
    fn test_rio_scenario() {
        let mut autofill = controller(OrderingPolicy::LatestIssued);
        let mut values = Values::default();
        let request = autofill.on_blur("12345678").unwrap();
        autofill.apply(LookupCompletion::new(request, Ok(rio())), &mut values);

        assert_eq!(values.get("city"), "Rio de Janeiro");
        assert_eq!(values.get("neighborhood"), "Centro");
        assert_eq!(values.get("street"), "Rua X");
        assert_eq!(values.get("state"), "RJ");
    }

    #[test]
    fn test_failure_leaves_fields_untouched() {
        let mut autofill = controller(OrderingPolicy::LatestIssued);
        let mut values = Values::seeded();
        let request = autofill.on_blur("99999-999").unwrap();
        let code = request.code.to_string();

        let outcome = autofill.apply(
            LookupCompletion::new(request, Err(LookupError::NotFound(code))),
            &mut values,
        );

        assert!(matches!(outcome, AutofillOutcome::Failed(_)));
        assert_eq!(values.get("city"), "typed city");
        assert_eq!(values.get("state"), "XX");
        assert!(!autofill.in_flight());
    }

    #[test]
    fn test_latest_issued_discards_stale_completion() {
        let mut autofill = controller(OrderingPolicy::LatestIssued);
        let mut values = Values::default();
        let a = autofill.on_blur("01001-000").unwrap();
        let b = autofill.on_blur("12345678").unwrap();

        // B answers first, A arrives late
        let first = autofill.apply(LookupCompletion::new(b, Ok(rio())), &mut values);
        let late = autofill.apply(LookupCompletion::new(a, Ok(sao_paulo())), &mut values);

        assert_eq!(first, AutofillOutcome::Applied(rio()));
        assert_eq!(late, AutofillOutcome::Superseded);
        assert_eq!(values.get("city"), "Rio de Janeiro");
    }

    #[test]
    fn test_latest_issued_keeps_pending_until_latest_completes() {
        let mut autofill = controller(OrderingPolicy::LatestIssued);
        let mut values = Values::default();
        let a = autofill.on_blur("01001-000").unwrap();
        let _b = autofill.on_blur("12345678").unwrap();

        autofill.apply(LookupCompletion::new(a, Ok(sao_paulo())), &mut values);
        assert!(autofill.in_flight());
        assert_eq!(values.get("city"), "");
    }

    #[test]
    fn test_arrival_policy_last_arrival_wins() {
        let mut autofill = controller(OrderingPolicy::Arrival);
        let mut values = Values::default();
        let a = autofill.on_blur("01001-000").unwrap();
        let b = autofill.on_blur("12345678").unwrap();

        autofill.apply(LookupCompletion::new(b, Ok(rio())), &mut values);
        let late = autofill.apply(LookupCompletion::new(a, Ok(sao_paulo())), &mut values);

        assert_eq!(late, AutofillOutcome::Applied(sao_paulo()));
        assert_eq!(values.get("city"), "São Paulo");
    }

    #[test]
    fn test_invalidate_makes_pending_lookup_stale() {
        let mut autofill = controller(OrderingPolicy::LatestIssued);
        let mut values = Values::default();
        let request = autofill.on_blur("01001-000").unwrap();
        autofill.invalidate();

        let outcome = autofill.apply(LookupCompletion::new(request, Ok(sao_paulo())), &mut values);
        assert_eq!(outcome, AutofillOutcome::Superseded);
        assert!(!autofill.in_flight());
        assert!(values.0.is_empty());
    }

    #[test]
    fn test_tickets_increase_monotonically() {
        let mut autofill = controller(OrderingPolicy::Arrival);
        let tickets: Vec<u64> = (0..3)
            .filter_map(|_| autofill.on_blur("01001000"))
            .map(|r| r.ticket.0)
            .collect();
        assert_eq!(tickets, vec![1, 2, 3]);
    }
}
