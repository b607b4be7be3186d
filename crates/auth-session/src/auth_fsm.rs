//! Session lifecycle state machine using rust-fsm.
//!
//! ```text
//!                 CachedProfile / ProfileConfirmed / LoginSucceeded
//! Bootstrapping ─────────────────────────────────────────────────► Authenticated
//!       │                                                             │   ▲
//!       │ NoCredential / Invalidated / LoggedOut   Invalidated /     │   │ LoginSucceeded
//!       ▼                                           LoggedOut         ▼   │
//!   Anonymous ◄────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Bootstrapping` is never re-entered. Teardown inputs are accepted in
//! every state so invalidation stays idempotent.

use inventory_types::SessionStatus;
use rust_fsm::*;

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Bootstrapping)

    Bootstrapping => {
        CachedProfile => Authenticated,
        ProfileConfirmed => Authenticated,
        NoCredential => Anonymous,
        Invalidated => Anonymous,
        LoginSucceeded => Authenticated,
        LoggedOut => Anonymous
    },
    Authenticated => {
        ProfileConfirmed => Authenticated,
        LoginSucceeded => Authenticated,
        Invalidated => Anonymous,
        LoggedOut => Anonymous
    },
    Anonymous => {
        LoginSucceeded => Authenticated,
        Invalidated => Anonymous,
        LoggedOut => Anonymous
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

impl From<&SessionMachineState> for SessionStatus {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::Bootstrapping => SessionStatus::Bootstrapping,
            SessionMachineState::Authenticated => SessionStatus::Authenticated,
            SessionMachineState::Anonymous => SessionStatus::Anonymous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine_in(inputs: &[SessionMachineInput]) -> SessionMachine {
        let mut machine = SessionMachine::new();
        for input in inputs {
            machine.consume(input).unwrap();
        }
        machine
    }

    #[test]
    fn test_initial_state_is_bootstrapping() {
        let machine = SessionMachine::new();
        assert_eq!(*machine.state(), SessionMachineState::Bootstrapping);
    }

    #[test]
    fn test_optimistic_then_confirmed() {
        let mut machine = machine_in(&[SessionMachineInput::CachedProfile]);
        assert_eq!(*machine.state(), SessionMachineState::Authenticated);

        machine
            .consume(&SessionMachineInput::ProfileConfirmed)
            .unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Authenticated);
    }

    #[test]
    fn test_bootstrap_without_cache_confirms_directly() {
        let machine = machine_in(&[SessionMachineInput::ProfileConfirmed]);
        assert_eq!(*machine.state(), SessionMachineState::Authenticated);
    }

    #[test]
    fn test_no_credential_goes_anonymous() {
        let machine = machine_in(&[SessionMachineInput::NoCredential]);
        assert_eq!(*machine.state(), SessionMachineState::Anonymous);
    }

    #[test]
    fn test_invalidation_is_idempotent() {
        let mut machine = machine_in(&[
            SessionMachineInput::LoginSucceeded,
            SessionMachineInput::Invalidated,
        ]);
        assert_eq!(*machine.state(), SessionMachineState::Anonymous);

        machine.consume(&SessionMachineInput::Invalidated).unwrap();
        machine.consume(&SessionMachineInput::LoggedOut).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Anonymous);
    }

    #[test]
    fn test_login_from_every_state() {
        for prefix in [
            vec![],
            vec![SessionMachineInput::CachedProfile],
            vec![SessionMachineInput::NoCredential],
        ] {
            let mut machine = machine_in(&prefix);
            machine.consume(&SessionMachineInput::LoginSucceeded).unwrap();
            assert_eq!(*machine.state(), SessionMachineState::Authenticated);
        }
    }

    #[test]
    fn test_bootstrap_inputs_rejected_after_bootstrap() {
        let mut machine = machine_in(&[SessionMachineInput::NoCredential]);

        assert!(machine.consume(&SessionMachineInput::CachedProfile).is_err());
        assert!(machine.consume(&SessionMachineInput::NoCredential).is_err());
        // A late profile must not resurrect an anonymous session.
        assert!(machine
            .consume(&SessionMachineInput::ProfileConfirmed)
            .is_err());
        assert_eq!(*machine.state(), SessionMachineState::Anonymous);

        let mut machine = machine_in(&[SessionMachineInput::LoginSucceeded]);
        assert!(machine.consume(&SessionMachineInput::CachedProfile).is_err());
    }

    #[test]
    fn test_status_conversion() {
        assert_eq!(
            SessionStatus::from(&SessionMachineState::Bootstrapping),
            SessionStatus::Bootstrapping
        );
        assert_eq!(
            SessionStatus::from(&SessionMachineState::Authenticated),
            SessionStatus::Authenticated
        );
        assert_eq!(
            SessionStatus::from(&SessionMachineState::Anonymous),
            SessionStatus::Anonymous
        );
    }
}
