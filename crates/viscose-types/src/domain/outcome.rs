use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell::WriteTarget;

/// Result of pushing one stats file through the sync pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// New personal best written to the sheet
    Written {
        target: WriteTarget,
        value: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        previous_best: Option<f64>,
    },
    /// The ledger already contains this file
    SkippedAlreadyProcessed,
    /// The file's score does not beat the recorded best
    SkippedNotImprovement { best: f64 },
    /// No worksheet has a row named after the scenario
    SkippedUnresolvedScenario,
    /// The scenario row exists but its worksheet has no score column
    SkippedUnresolvedColumn { worksheet: String },
    /// The file is not a well-formed stats export
    ParseFailed { reason: String },
    /// Reading or writing the remote sheet failed
    TransportFailed { reason: String },
}

/// Field-less discriminant of [`SyncOutcome`], used for counting and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Written,
    SkippedAlreadyProcessed,
    SkippedNotImprovement,
    SkippedUnresolvedScenario,
    SkippedUnresolvedColumn,
    ParseFailed,
    TransportFailed,
}

impl SyncOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            SyncOutcome::Written { .. } => OutcomeKind::Written,
            SyncOutcome::SkippedAlreadyProcessed => OutcomeKind::SkippedAlreadyProcessed,
            SyncOutcome::SkippedNotImprovement { .. } => OutcomeKind::SkippedNotImprovement,
            SyncOutcome::SkippedUnresolvedScenario => OutcomeKind::SkippedUnresolvedScenario,
            SyncOutcome::SkippedUnresolvedColumn { .. } => OutcomeKind::SkippedUnresolvedColumn,
            SyncOutcome::ParseFailed { .. } => OutcomeKind::ParseFailed,
            SyncOutcome::TransportFailed { .. } => OutcomeKind::TransportFailed,
        }
    }

    /// Whether the same file contents would produce the same outcome next cycle.
    ///
    /// Unresolved and transport outcomes depend on the remote sheet and are
    /// retried every cycle; everything else only changes when the file does.
    pub fn is_settled(&self) -> bool {
        !matches!(
            self,
            SyncOutcome::SkippedUnresolvedScenario
                | SyncOutcome::SkippedUnresolvedColumn { .. }
                | SyncOutcome::TransportFailed { .. }
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SyncOutcome::ParseFailed { .. } | SyncOutcome::TransportFailed { .. }
        )
    }
}

impl OutcomeKind {
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::Written => "written",
            OutcomeKind::SkippedAlreadyProcessed => "already processed",
            OutcomeKind::SkippedNotImprovement => "not an improvement",
            OutcomeKind::SkippedUnresolvedScenario => "scenario not found",
            OutcomeKind::SkippedUnresolvedColumn => "score column not found",
            OutcomeKind::ParseFailed => "parse failed",
            OutcomeKind::TransportFailed => "sheet error",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellRef;

    #[test]
    fn test_settled_outcomes() {
        assert!(SyncOutcome::SkippedAlreadyProcessed.is_settled());
        assert!(SyncOutcome::SkippedNotImprovement { best: 1.0 }.is_settled());
        assert!(
            SyncOutcome::ParseFailed {
                reason: "x".into()
            }
            .is_settled()
        );
        assert!(!SyncOutcome::SkippedUnresolvedScenario.is_settled());
        assert!(
            !SyncOutcome::TransportFailed {
                reason: "x".into()
            }
            .is_settled()
        );
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = SyncOutcome::Written {
            target: WriteTarget {
                worksheet: "Novice".to_string(),
                cell: CellRef::new(2, 3),
                header: "High Score".to_string(),
            },
            value: 120.0,
            previous_best: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "written");
        assert_eq!(json["target"]["cell"], "D3");
        assert!(json.get("previous_best").is_none());

        let skipped = serde_json::to_value(SyncOutcome::SkippedUnresolvedScenario).unwrap();
        assert_eq!(skipped["outcome"], "skipped_unresolved_scenario");
    }
}
