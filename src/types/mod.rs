pub use self::{
    asset::Asset,
    email_message::{EmailAddressee, EmailAttachment, EmailMessage, EmailRequest},
    insight_response::{
        InsightTransaction, InsightTransactionInput, InsightTransactionsResponse,
    },
    ripple_rpc::{
        RippleAccountTxParams, RippleAccountTxResult, RippleRequest,
        RippleResponse, RippleTransaction, RippleTransactionBody,
        RippleTransactionMeta,
    },
    samurai_operation::{
        SamuraiErc20TransfersRequest, SamuraiOperation, SamuraiOperationsHistory,
    },
    slack_response::SlackResponse,
};

mod asset;
mod email_message;
mod insight_response;
mod ripple_rpc;
mod samurai_operation;
mod slack_response;
