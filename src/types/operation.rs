//! Operation types for Safe transactions

use serde::{Deserialize, Serialize};

/// Operation type of an atomic action
///
/// Serialized as the numeric value used on-chain and by the transaction
/// service (`0` = call, `1` = delegatecall).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Operation {
    /// Regular call (default)
    #[default]
    Call = 0,
    /// Delegate call (executes target code in the Safe's storage context)
    DelegateCall = 1,
}

impl Operation {
    /// Returns the operation as a u8 value
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Creates an Operation from a u8 value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Operation::Call),
            1 => Some(Operation::DelegateCall),
            _ => None,
        }
    }

    /// Parses the loosely typed operation values decoders emit (`0`, `"1"`, ...)
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .and_then(Self::from_u8),
            serde_json::Value::String(s) => s.trim().parse::<u8>().ok().and_then(Self::from_u8),
            _ => None,
        }
    }

    pub fn is_delegate_call(&self) -> bool {
        matches!(self, Operation::DelegateCall)
    }
}

impl From<Operation> for u8 {
    fn from(op: Operation) -> Self {
        op.as_u8()
    }
}

impl TryFrom<u8> for Operation {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Operation::from_u8(value).ok_or("Invalid operation value")
    }
}
