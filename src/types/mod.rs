//! Type definitions for decoded Safe transactions

mod decoded;
mod operation;
mod tx_info;

pub use decoded::{
    BatchEntry, DataDecoded, DecodedCallKind, DecodedTransaction, ExecTransactionCall, Parameter,
    ValueDecoded, EXEC_TRANSACTION, MULTI_SEND,
};
pub use operation::Operation;
pub use tx_info::TxInfo;
