use std::sync::Arc;

use super::*;
use crate::Error;
use crate::KvStateMachine;
use crate::LogId;
use crate::StateMachine;

#[test]
fn loopback_assigns_consecutive_indexes() {
    let sm = Arc::new(KvStateMachine::new("n1"));
    let proposer = LoopbackProposer::new(sm.clone());

    proposer.propose(b"SET a 1".to_vec()).unwrap();
    proposer.propose(b"SET b 2".to_vec()).unwrap();

    assert_eq!(sm.last_applied(), LogId { index: 2, term: 1 });
    assert_eq!(sm.get("b").as_deref(), Some("2"));
}

#[test]
fn loopback_reports_malformed_command_as_rejected_proposal() {
    let sm = Arc::new(KvStateMachine::new("n1"));
    let proposer = LoopbackProposer::new(sm.clone());

    let err = proposer.propose(b"SET lonely".to_vec()).unwrap_err();
    assert!(matches!(err, Error::Proposal(_)));
    assert!(sm.is_empty());

    // index is consumed, the next command still applies
    proposer.propose(b"SET k v".to_vec()).unwrap();
    assert_eq!(sm.last_applied().index, 2);
}
