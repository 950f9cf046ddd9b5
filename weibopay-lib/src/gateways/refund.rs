//! Refund status lookup.

use super::{FindQuery, Operation, OrderRef, SubGateway};
use crate::{Result, WeiboPayError};

/// Refund query endpoint.
pub const REFUND_QUERY_ENDPOINT: &str = "pay/refund/query";

/// Identifying keys a refund query may carry, in the order they are checked.
pub const REFUND_QUERY_KEYS: [&str; 3] = ["pay_id", "out_refund_id", "refund_id"];

/// Refund lookup. A bare identifier is the merchant's `out_refund_id`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RefundGateway;

impl SubGateway for RefundGateway {
    fn operation(&self) -> Operation {
        Operation::RefundQuery
    }

    fn find(&self, order: &OrderRef) -> Result<FindQuery> {
        let mut query = FindQuery::new(REFUND_QUERY_ENDPOINT);
        match order {
            OrderRef::Id(_) => {
                query = query.with("out_refund_id", order.require("out_refund_id")?);
            }
            OrderRef::Fields(fields) => {
                for key in REFUND_QUERY_KEYS {
                    if let Some(value) = fields.get_text(key) {
                        query = query.with(key, value);
                    }
                }
            }
        }

        if query.fields.is_empty() {
            return Err(WeiboPayError::invalid_data(
                "order",
                "refund query needs one of pay_id, out_refund_id, refund_id",
            ));
        }
        Ok(query)
    }
}
