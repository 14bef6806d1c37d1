//! Reminder lifecycle

use relocrm_common::StateMachine;

use super::entities::ReminderStatus;

impl StateMachine for ReminderStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        use ReminderStatus::*;
        match self {
            Open => &[Snoozed, Completed, Dismissed],
            Snoozed => &[Open, Completed, Dismissed],
            Completed => &[Open],
            Dismissed => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReminderStatus::*;

    #[test]
    fn test_dismissed_is_terminal() {
        assert!(Dismissed.is_terminal());
        assert!(Dismissed.transition_to(Open).is_err());
    }

    #[test]
    fn test_completed_can_only_reopen() {
        assert_eq!(Completed.valid_transitions(), &[Open]);
        assert!(!Completed.can_transition_to(Snoozed));
    }

    #[test]
    fn test_snoozed_cannot_snooze_again() {
        assert!(!Snoozed.can_transition_to(Snoozed));
        assert!(Snoozed.can_transition_to(Open));
    }
}
