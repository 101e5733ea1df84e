//! Unwrapping of `execTransaction` / `multiSend` wrappers into atomic actions

use crate::error::Result;
use crate::types::{DecodedCallKind, DecodedTransaction};

/// Flattens `tx` into the ordered list of atomic actions it performs.
///
/// `execTransaction` wrappers are transparent: only the inner call is kept.
/// `multiSend` batches expand into their entries in batch order, and an empty
/// batch contributes nothing. Anything else is a leaf and is returned as is.
///
/// Fails only on an `execTransaction` decoding with fewer than three
/// parameters, which is a decoder contract violation.
pub fn flatten(tx: &DecodedTransaction) -> Result<Vec<DecodedTransaction>> {
    let mut leaves = Vec::new();
    flatten_into(tx, &mut leaves)?;
    Ok(leaves)
}

fn flatten_into(tx: &DecodedTransaction, leaves: &mut Vec<DecodedTransaction>) -> Result<()> {
    match tx.kind()? {
        DecodedCallKind::ExecTransaction(call) => flatten_into(&call.to_transaction(), leaves),
        DecodedCallKind::MultiSend(entries) => {
            for entry in entries {
                flatten_into(&DecodedTransaction::from(entry.clone()), leaves)?;
            }
            Ok(())
        }
        DecodedCallKind::Opaque => {
            leaves.push(tx.clone());
            Ok(())
        }
    }
}
