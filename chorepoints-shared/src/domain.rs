use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored enum column held a value this build does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// Status columns are stored as lowercase text; this keeps the three
// representations (Rust, serde, SQL) in one place per enum.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError::new($kind, other)),
                }
            }
        }
    };
}

/// A parent's verdict on a submitted task or a pending claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

text_enum!(Decision, "decision", {
    Approved => "approved",
    Rejected => "rejected",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Assigned,
    Submitted,
    Approved,
    Rejected,
}

text_enum!(TaskStatus, "task status", {
    Assigned => "assigned",
    Submitted => "submitted",
    Approved => "approved",
    Rejected => "rejected",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    Submit,
    Verify(Decision),
}

impl TaskStatus {
    /// The only place task transitions are decided. `None` means the event
    /// is not allowed from the current status.
    pub fn next(self, event: TaskEvent) -> Option<TaskStatus> {
        match (self, event) {
            (TaskStatus::Assigned, TaskEvent::Submit) => Some(TaskStatus::Submitted),
            (TaskStatus::Submitted, TaskEvent::Verify(Decision::Approved)) => {
                Some(TaskStatus::Approved)
            }
            (TaskStatus::Submitted, TaskEvent::Verify(Decision::Rejected)) => {
                Some(TaskStatus::Rejected)
            }
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Approved | TaskStatus::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

text_enum!(ClaimStatus, "claim status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

impl ClaimStatus {
    pub fn next(self, decision: Decision) -> Option<ClaimStatus> {
        match (self, decision) {
            (ClaimStatus::Pending, Decision::Approved) => Some(ClaimStatus::Approved),
            (ClaimStatus::Pending, Decision::Rejected) => Some(ClaimStatus::Rejected),
            _ => None,
        }
    }
}

/// Expiry is not a status: it is decided by comparing `expires_at` with the
/// clock at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    Active,
    Used,
}

text_enum!(CodeStatus, "invitation status", {
    Active => "active",
    Used => "used",
});

impl CodeStatus {
    pub fn next(self) -> Option<CodeStatus> {
        match self {
            CodeStatus::Active => Some(CodeStatus::Used),
            CodeStatus::Used => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    TaskCompletion,
    Redemption,
    ManualAdjustment,
    Refund,
}

text_enum!(LedgerKind, "ledger kind", {
    TaskCompletion => "task_completion",
    Redemption => "redemption",
    ManualAdjustment => "manual_adjustment",
    Refund => "refund",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_walks_happy_path() {
        let s = TaskStatus::Assigned;
        let s = s.next(TaskEvent::Submit).unwrap();
        assert_eq!(s, TaskStatus::Submitted);
        let s = s.next(TaskEvent::Verify(Decision::Approved)).unwrap();
        assert_eq!(s, TaskStatus::Approved);
        assert!(s.is_terminal());
    }

    #[test]
    fn task_status_rejects_out_of_order_events() {
        assert_eq!(
            TaskStatus::Assigned.next(TaskEvent::Verify(Decision::Approved)),
            None
        );
        assert_eq!(TaskStatus::Submitted.next(TaskEvent::Submit), None);
        assert_eq!(TaskStatus::Approved.next(TaskEvent::Submit), None);
        assert_eq!(
            TaskStatus::Rejected.next(TaskEvent::Verify(Decision::Approved)),
            None
        );
    }

    #[test]
    fn claim_status_is_decided_once() {
        assert_eq!(
            ClaimStatus::Pending.next(Decision::Rejected),
            Some(ClaimStatus::Rejected)
        );
        assert_eq!(ClaimStatus::Approved.next(Decision::Rejected), None);
        assert_eq!(ClaimStatus::Rejected.next(Decision::Approved), None);
    }

    #[test]
    fn code_status_is_single_use() {
        assert_eq!(CodeStatus::Active.next(), Some(CodeStatus::Used));
        assert_eq!(CodeStatus::Used.next(), None);
    }

    #[test]
    fn text_forms_round_trip_and_reject_unknown() {
        assert_eq!(
            "manual_adjustment".parse::<LedgerKind>().unwrap(),
            LedgerKind::ManualAdjustment
        );
        assert_eq!(TaskStatus::Submitted.to_string(), "submitted");
        let err = "archived".parse::<ClaimStatus>().unwrap_err();
        assert_eq!(err.kind, "claim status");
        assert_eq!(err.value, "archived");
    }

    #[test]
    fn serde_uses_the_stored_text() {
        let json = serde_json::to_string(&LedgerKind::TaskCompletion).unwrap();
        assert_eq!(json, "\"task_completion\"");
        let d: Decision = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(d, Decision::Rejected);
    }
}
