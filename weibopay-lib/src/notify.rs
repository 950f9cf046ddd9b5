//! Inbound notification intake.
//!
//! The provider calls the merchant's `notify_url` with the signed result of
//! a payment or refund, usually as a form POST and occasionally as a GET
//! query string. The web framework in front of the merchant hands us both
//! raw parts; [`crate::WeiboPay::verify_request`] checks the signature.

use crate::FieldMap;

/// Body the merchant must answer a verified notification with.
pub const NOTIFY_ACK: &str = "success";

/// Raw parts of an inbound notification request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InboundRequest {
    /// Decoded `application/x-www-form-urlencoded` body.
    pub form: FieldMap,
    /// Decoded query string.
    pub query: FieldMap,
}

impl InboundRequest {
    /// Build from a raw body and a raw query string (with or without `?`).
    pub fn from_parts(body: &str, query: &str) -> Self {
        Self {
            form: FieldMap::from_form(body.trim()),
            query: FieldMap::from_form(query.trim()),
        }
    }

    pub fn from_form(form: FieldMap) -> Self {
        Self {
            form,
            query: FieldMap::new(),
        }
    }

    pub fn from_query(query: FieldMap) -> Self {
        Self {
            form: FieldMap::new(),
            query,
        }
    }

    /// The fields to verify: the form body when it has any, the query otherwise.
    pub fn fields(&self) -> &FieldMap {
        if self.form.is_empty() {
            &self.query
        } else {
            &self.form
        }
    }

    /// Which part [`fields`](Self::fields) read from.
    pub fn source(&self) -> &'static str {
        if self.form.is_empty() {
            "query"
        } else {
            "form"
        }
    }
}
