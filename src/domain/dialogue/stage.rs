//! Conversation stage state machine.
//!
//! Tracks where a session is in the collect-confirm-search lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The stage of one conversation session.
///
/// Sessions move from `Initial` through `Collecting` (asking for missing
/// entities, possibly via `Confirming` on an intent switch) to `Searching`
/// and `Complete`. `Complete` and `Error` are re-enterable: the next user
/// turn resumes the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Fresh session, no intent adopted yet.
    #[default]
    Initial,

    /// Asking the user for missing entities.
    Collecting,

    /// Waiting for the user to confirm entity reuse after an intent switch.
    Confirming,

    /// All required entities present, retrieval in flight.
    Searching,

    /// Retrieval finished and results delivered.
    Complete,

    /// The last retrieval attempt failed; entities are kept for a retry.
    Error,
}

impl Stage {
    /// Returns true if the relevance filter applies to the next utterance.
    ///
    /// Mid-collection replies are often bare values ("43", "Broward") that
    /// the filter would wrongly reject, so `Collecting` is exempt.
    pub fn screens_input(&self) -> bool {
        !matches!(self, Self::Collecting)
    }

    /// Returns true if a pending confirmation must be resolved this turn.
    pub fn awaits_confirmation(&self) -> bool {
        matches!(self, Self::Confirming)
    }

    /// Returns true if a search already ran to completion.
    pub fn has_answered(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl StateMachine for Stage {
    fn can_transition_to(&self, target: &Self) -> bool {
        use Stage::*;
        matches!(
            (self, target),
            // First turn may start collecting, confirm nothing, or go
            // straight to search when everything was supplied at once
            (Initial, Collecting) | (Initial, Searching) |
            // Collection loops until requirements are met
            (Collecting, Collecting) | (Collecting, Confirming) | (Collecting, Searching) |
            // Confirmation resolves back into collection or straight to search
            (Confirming, Collecting) | (Confirming, Searching) |
            // Retrieval ends in delivery or a retryable failure
            (Searching, Complete) | (Searching, Error) |
            // Completed and failed sessions accept follow-up turns
            (Complete, Collecting) | (Complete, Confirming) | (Complete, Searching) |
            (Error, Collecting) | (Error, Confirming) | (Error, Searching)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use Stage::*;
        match self {
            Initial => vec![Collecting, Searching],
            Collecting => vec![Collecting, Confirming, Searching],
            Confirming => vec![Collecting, Searching],
            Searching => vec![Complete, Error],
            Complete => vec![Collecting, Confirming, Searching],
            Error => vec![Collecting, Confirming, Searching],
        }
    }
}
