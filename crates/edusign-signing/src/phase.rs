//! # Signing Phases
//!
//! Every signing attempt walks this machine:
//!
//! ```text
//! Requested ─▶ Verifying ─┬─▶ VerificationFailed
//!                         └─▶ Verified ─▶ GeneratingArtifact ─┬─▶ GenerationFailed
//!                                                             └─▶ ArtifactReady ─▶ Hashing
//!     ─▶ Persisting ─▶ StatusTransition ─▶ CounterSigning ─▶ Completed
//! ```
//!
//! Any phase after `ArtifactReady` may also move to `RolledBack`, which is
//! where a failed commit ends. Terminal phases have no outgoing transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of one signing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SigningPhase {
    Requested,
    Verifying,
    VerificationFailed,
    Verified,
    GeneratingArtifact,
    GenerationFailed,
    ArtifactReady,
    Hashing,
    Persisting,
    StatusTransition,
    CounterSigning,
    Completed,
    /// Staged writes were discarded after a failure past `ArtifactReady`.
    RolledBack,
}

impl SigningPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Verifying => "VERIFYING",
            Self::VerificationFailed => "VERIFICATION_FAILED",
            Self::Verified => "VERIFIED",
            Self::GeneratingArtifact => "GENERATING_ARTIFACT",
            Self::GenerationFailed => "GENERATION_FAILED",
            Self::ArtifactReady => "ARTIFACT_READY",
            Self::Hashing => "HASHING",
            Self::Persisting => "PERSISTING",
            Self::StatusTransition => "STATUS_TRANSITION",
            Self::CounterSigning => "COUNTER_SIGNING",
            Self::Completed => "COMPLETED",
            Self::RolledBack => "ROLLED_BACK",
        }
    }

    pub fn valid_transitions(&self) -> &'static [SigningPhase] {
        match self {
            Self::Requested => &[Self::Verifying],
            Self::Verifying => &[Self::VerificationFailed, Self::Verified],
            Self::Verified => &[Self::GeneratingArtifact],
            Self::GeneratingArtifact => &[Self::GenerationFailed, Self::ArtifactReady],
            Self::ArtifactReady => &[Self::Hashing, Self::RolledBack],
            Self::Hashing => &[Self::Persisting, Self::RolledBack],
            Self::Persisting => &[Self::StatusTransition, Self::RolledBack],
            Self::StatusTransition => &[Self::CounterSigning, Self::RolledBack],
            Self::CounterSigning => &[Self::Completed, Self::RolledBack],
            Self::VerificationFailed | Self::GenerationFailed | Self::Completed | Self::RolledBack => &[],
        }
    }

    pub fn can_transition_to(&self, to: SigningPhase) -> bool {
        self.valid_transitions().contains(&to)
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl std::fmt::Display for SigningPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTransition {
    pub from: SigningPhase,
    pub to: SigningPhase,
    pub at: DateTime<Utc>,
}

/// Phase history of one attempt. Starts at `Requested`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseLog {
    current: SigningPhase,
    transitions: Vec<PhaseTransition>,
}

impl Default for PhaseLog {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseLog {
    pub fn new() -> Self {
        Self {
            current: SigningPhase::Requested,
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> SigningPhase {
        self.current
    }

    pub fn transitions(&self) -> &[PhaseTransition] {
        &self.transitions
    }

    /// Phases visited so far, starting with `Requested`.
    pub fn visited(&self) -> Vec<SigningPhase> {
        std::iter::once(SigningPhase::Requested)
            .chain(self.transitions.iter().map(|t| t.to))
            .collect()
    }

    /// Move to `to`.
    ///
    /// # Errors
    ///
    /// Returns the rejected `(from, to)` pair if the machine does not allow it.
    pub fn advance(&mut self, to: SigningPhase) -> Result<(), (SigningPhase, SigningPhase)> {
        let from = self.current;
        if !from.can_transition_to(to) {
            return Err((from, to));
        }
        tracing::debug!(from = %from, to = %to, "signing phase");
        self.transitions.push(PhaseTransition {
            from,
            to,
            at: Utc::now(),
        });
        self.current = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SigningPhase::*;

    const HAPPY_PATH: [SigningPhase; 9] = [
        Verifying,
        Verified,
        GeneratingArtifact,
        ArtifactReady,
        Hashing,
        Persisting,
        StatusTransition,
        CounterSigning,
        Completed,
    ];

    #[test]
    fn happy_path_is_accepted() {
        let mut log = PhaseLog::new();
        for phase in HAPPY_PATH {
            log.advance(phase).unwrap();
        }
        assert_eq!(log.current(), Completed);
        assert!(log.current().is_terminal());
        assert_eq!(log.visited().len(), 10);
        assert_eq!(log.visited()[0], Requested);
        assert_eq!(log.advance(Completed), Err((Completed, Completed)));
    }

    #[test]
    fn verification_cannot_be_skipped() {
        let mut log = PhaseLog::new();
        assert_eq!(log.advance(GeneratingArtifact), Err((Requested, GeneratingArtifact)));
        assert!(log.transitions().is_empty());
    }

    #[test]
    fn failure_phases_are_terminal() {
        for p in [VerificationFailed, GenerationFailed, RolledBack, Completed] {
            assert!(p.is_terminal(), "{p} should be terminal");
        }
    }

    #[test]
    fn rollback_only_after_artifact() {
        assert!(!Verified.can_transition_to(RolledBack));
        assert!(!GeneratingArtifact.can_transition_to(RolledBack));
        for p in [ArtifactReady, Hashing, Persisting, StatusTransition, CounterSigning] {
            assert!(p.can_transition_to(RolledBack));
        }
    }

    #[test]
    fn wire_names() {
        assert_eq!(StatusTransition.as_str(), "STATUS_TRANSITION");
        assert_eq!(
            serde_json::to_string(&GenerationFailed).unwrap(),
            "\"GENERATION_FAILED\""
        );
    }
}
