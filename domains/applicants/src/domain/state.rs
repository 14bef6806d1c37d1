//! State machines for applicant status and housing search stage
//!
//! Applicant: Submitted → Approved | Rejected | Withdrawn; Approved → Withdrawn;
//! Rejected → Submitted; Withdrawn → Submitted.
//!
//! Housing search: AwaitingAgreements → Searching → UnderContract → Closed →
//! MovedIn, with Searching → AwaitingAgreements and UnderContract → Searching
//! as the backward moves. MovedIn is terminal.

use relocrm_common::StateMachine;

use super::entities::ApplicantStatus;
use super::housing::HousingSearchStage;

impl StateMachine for ApplicantStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::Submitted => &[Self::Approved, Self::Rejected, Self::Withdrawn],
            Self::Approved => &[Self::Withdrawn],
            Self::Rejected => &[Self::Submitted],
            Self::Withdrawn => &[Self::Submitted],
        }
    }
}

/// The first entry of each list is the forward move.
impl StateMachine for HousingSearchStage {
    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::AwaitingAgreements => &[Self::Searching],
            Self::Searching => &[Self::UnderContract, Self::AwaitingAgreements],
            Self::UnderContract => &[Self::Closed, Self::Searching],
            Self::Closed => &[Self::MovedIn],
            Self::MovedIn => &[],
        }
    }
}

impl HousingSearchStage {
    /// Forward stage, if any
    pub fn next_stage(&self) -> Option<Self> {
        self.valid_transitions().first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relocrm_common::StateError;

    #[test]
    fn test_applicant_transitions() {
        use ApplicantStatus::*;
        assert!(Submitted.can_transition_to(Approved));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(Submitted.can_transition_to(Withdrawn));
        assert!(Approved.can_transition_to(Withdrawn));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(Rejected.can_transition_to(Submitted));
        assert!(Withdrawn.can_transition_to(Submitted));
        assert!(!Withdrawn.can_transition_to(Approved));
    }

    #[test]
    fn test_applicant_same_state_rejected() {
        assert!(matches!(
            ApplicantStatus::Submitted.transition_to(ApplicantStatus::Submitted),
            Err(StateError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_no_applicant_status_is_terminal() {
        for status in ApplicantStatus::ALL {
            assert!(!status.is_terminal(), "{} should not be terminal", status);
        }
    }

    #[test]
    fn test_stage_forward_path() {
        use HousingSearchStage::*;
        let mut stage = AwaitingAgreements;
        let mut path = vec![stage];
        while let Some(next) = stage.next_stage() {
            stage = stage.transition_to(next).unwrap();
            path.push(stage);
        }
        assert_eq!(
            path,
            vec![AwaitingAgreements, Searching, UnderContract, Closed, MovedIn]
        );
    }

    #[test]
    fn test_stage_backward_moves() {
        use HousingSearchStage::*;
        assert!(Searching.can_transition_to(AwaitingAgreements));
        assert!(UnderContract.can_transition_to(Searching));
        assert!(!Closed.can_transition_to(UnderContract));
        assert!(!AwaitingAgreements.can_transition_to(UnderContract));
    }

    #[test]
    fn test_moved_in_is_terminal() {
        assert!(HousingSearchStage::MovedIn.is_terminal());
        assert!(matches!(
            HousingSearchStage::MovedIn.transition_to(HousingSearchStage::Closed),
            Err(StateError::TerminalState(_))
        ));
    }
}
