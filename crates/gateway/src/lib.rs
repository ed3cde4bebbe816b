mod confirm;
mod ledger;
mod signer;
mod submit;

pub use confirm::{
    ConfirmOutcome, ConfirmationPolicy, MultiAttemptConfirmation, SinglePassConfirmation,
};
pub use ledger::{
    ConfirmationStatus, FinalityReference, LedgerClient, LedgerError, RpcLedgerClient,
    SignatureStatus, SubmissionOptions, TransactionRecord,
};
pub use signer::{SigningAuthority, SigningError};
pub use submit::SubmissionGateway;
