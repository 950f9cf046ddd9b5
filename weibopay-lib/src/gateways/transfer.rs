//! Transfer confirmation and lookup.

use url::Url;

use super::{FindQuery, Operation, OrderRef, PayRequest, SubGateway};
use crate::signing::CanonicalSigner;
use crate::{FieldMap, Result};

pub const TRANSFER_CONFIRM_ENDPOINT: &str = "transfer/confirm";
pub const TRANSFER_QUERY_ENDPOINT: &str = "transfer/query";

/// Confirms a pending transfer with a server-to-server call.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransferConfirmGateway;

impl SubGateway for TransferConfirmGateway {
    fn operation(&self) -> Operation {
        Operation::TransferConfirm
    }

    fn pay(&self, _base_uri: &Url, payload: FieldMap, signer: &CanonicalSigner) -> Result<PayRequest> {
        Ok(PayRequest::Submit {
            endpoint: TRANSFER_CONFIRM_ENDPOINT,
            payload: signer.sign_payload(payload)?,
        })
    }

    fn find(&self, order: &OrderRef) -> Result<FindQuery> {
        Ok(FindQuery::new(TRANSFER_QUERY_ENDPOINT).with("transfer_id", order.require("transfer_id")?))
    }
}
