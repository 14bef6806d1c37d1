//! State machines for listings, matches and showings
//!
//! Listing: Active → UnderContract | OffMarket; UnderContract → Active | Sold;
//! OffMarket → Active; Sold is terminal.
//!
//! Match: MatchIdentified → ShowingRequested → ShowingScheduled →
//! ShowingCompleted → OfferMade → UnderContract, with backward moves to
//! request another showing and Rejected reachable from every open state.
//!
//! Showing: Scheduled → Completed | Cancelled | NoShow.

use relocrm_common::StateMachine;

use super::entities::ListingStatus;
use super::matches::MatchStatus;
use super::showings::ShowingStatus;

impl StateMachine for ListingStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::Active => &[Self::UnderContract, Self::OffMarket],
            Self::UnderContract => &[Self::Active, Self::Sold],
            Self::OffMarket => &[Self::Active],
            Self::Sold => &[],
        }
    }
}

impl StateMachine for MatchStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::MatchIdentified => &[Self::ShowingRequested, Self::Rejected],
            Self::ShowingRequested => &[
                Self::ShowingScheduled,
                Self::MatchIdentified,
                Self::Rejected,
            ],
            Self::ShowingScheduled => &[
                Self::ShowingCompleted,
                Self::ShowingRequested,
                Self::Rejected,
            ],
            Self::ShowingCompleted => &[Self::OfferMade, Self::ShowingRequested, Self::Rejected],
            Self::OfferMade => &[Self::UnderContract, Self::Rejected],
            Self::UnderContract | Self::Rejected => &[],
        }
    }
}

impl StateMachine for ShowingStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::Scheduled => &[Self::Completed, Self::Cancelled, Self::NoShow],
            Self::Completed | Self::Cancelled | Self::NoShow => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relocrm_common::StateError;

    #[test]
    fn test_sold_is_terminal() {
        assert!(ListingStatus::Sold.is_terminal());
        assert!(matches!(
            ListingStatus::Sold.transition_to(ListingStatus::Active),
            Err(StateError::TerminalState(_))
        ));
    }

    #[test]
    fn test_off_market_only_returns_to_active() {
        assert!(ListingStatus::OffMarket.can_transition_to(ListingStatus::Active));
        assert!(!ListingStatus::OffMarket.can_transition_to(ListingStatus::Sold));
    }

    #[test]
    fn test_match_happy_path() {
        use MatchStatus::*;
        let mut status = MatchIdentified;
        for next in [
            ShowingRequested,
            ShowingScheduled,
            ShowingCompleted,
            OfferMade,
            UnderContract,
        ] {
            status = status.transition_to(next).unwrap();
        }
        assert!(status.is_terminal());
    }

    #[test]
    fn test_match_cannot_skip_to_offer() {
        assert!(matches!(
            MatchStatus::MatchIdentified.transition_to(MatchStatus::OfferMade),
            Err(StateError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_every_open_match_state_can_be_rejected() {
        for status in MatchStatus::ALL {
            if !status.is_terminal() {
                assert!(status.can_transition_to(MatchStatus::Rejected), "{}", status);
            }
        }
    }

    #[test]
    fn test_showing_outcomes_are_terminal() {
        for status in [
            ShowingStatus::Completed,
            ShowingStatus::Cancelled,
            ShowingStatus::NoShow,
        ] {
            assert!(status.is_terminal());
        }
        assert!(ShowingStatus::Scheduled.can_transition_to(ShowingStatus::NoShow));
    }

    #[test]
    fn test_same_state_transition_rejected() {
        assert!(ListingStatus::Active
            .transition_to(ListingStatus::Active)
            .is_err());
    }
}
