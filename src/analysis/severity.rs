//! Severity scale, finding groups and per-group status codes

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// How urgently a finding needs the signer's attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Info,
    Warn,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Category every finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusGroup {
    RecipientInteraction,
    RecipientActivity,
    Bridge,
    ContractVerification,
    ContractInteraction,
    Delegatecall,
    Threat,
    BalanceChange,
}

impl StatusGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusGroup::RecipientInteraction => "RECIPIENT_INTERACTION",
            StatusGroup::RecipientActivity => "RECIPIENT_ACTIVITY",
            StatusGroup::Bridge => "BRIDGE",
            StatusGroup::ContractVerification => "CONTRACT_VERIFICATION",
            StatusGroup::ContractInteraction => "CONTRACT_INTERACTION",
            StatusGroup::Delegatecall => "DELEGATECALL",
            StatusGroup::Threat => "THREAT",
            StatusGroup::BalanceChange => "BALANCE_CHANGE",
        }
    }
}

impl fmt::Display for StatusGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A status code scoped to one [`StatusGroup`]
pub trait Status:
    fmt::Debug + Copy + Eq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Group the status belongs to
    const GROUP: StatusGroup;

    /// Status reported when the check itself could not complete
    const FAILED: Self;

    fn severity(&self) -> Severity;

    /// Short human readable headline
    fn title(&self) -> &'static str;

    fn is_failed(&self) -> bool {
        *self == Self::FAILED
    }
}

/// Declares a group's status enum. Every group also has a `FAILED` status,
/// which is always `CRITICAL`.
macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident in $group:ident {
            $($variant:ident => ($severity:ident, $title:literal),)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant,)+
            Failed,
        }

        impl Status for $name {
            const GROUP: StatusGroup = StatusGroup::$group;
            const FAILED: Self = Self::Failed;

            fn severity(&self) -> Severity {
                match self {
                    $(Self::$variant => Severity::$severity,)+
                    Self::Failed => Severity::Critical,
                }
            }

            fn title(&self) -> &'static str {
                match self {
                    $(Self::$variant => $title,)+
                    Self::Failed => "Analysis failed",
                }
            }
        }
    };
}

status_enum! {
    /// Whether the Safe has sent funds to the recipient before
    RecipientInteractionStatus in RecipientInteraction {
        NewRecipient => (Info, "New recipient"),
        RecurringRecipient => (Ok, "Recurring recipient"),
    }
}

status_enum! {
    /// How established a recipient Safe is
    RecipientActivityStatus in RecipientActivity {
        LowActivity => (Warn, "Low activity recipient"),
    }
}

status_enum! {
    /// Whether funds bridged to another chain land in a Safe the signers control
    BridgeStatus in Bridge {
        IncompatibleSafe => (Critical, "Incompatible Safe"),
        MissingOwnership => (Warn, "Missing ownership"),
        UnsupportedNetwork => (Warn, "Unsupported network"),
        DifferentSafeSetup => (Info, "Different Safe setup"),
    }
}

status_enum! {
    ContractVerificationStatus in ContractVerification {
        Verified => (Ok, "Verified contract"),
        NotVerified => (Warn, "Unverified contract"),
        VerificationUnavailable => (Info, "Verification unavailable"),
    }
}

status_enum! {
    ContractInteractionStatus in ContractInteraction {
        KnownContract => (Ok, "Known contract"),
        NewContract => (Info, "New contract"),
    }
}

status_enum! {
    DelegatecallStatus in Delegatecall {
        UnexpectedDelegatecall => (Critical, "Unexpected delegatecall"),
    }
}

status_enum! {
    /// Verdicts and structural changes reported by the threat scan
    ThreatStatus in Threat {
        NoThreat => (Ok, "No threat detected"),
        Moderate => (Warn, "Moderate threat"),
        Malicious => (Critical, "Malicious threat detected"),
        MastercopyChange => (Critical, "Mastercopy change"),
        OwnershipChange => (Warn, "Ownership change"),
        ModuleChange => (Warn, "Modules change"),
    }
}
