use std::collections::BTreeMap;

use super::*;
use crate::Error;
use crate::StateMachineError;

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn encode_emits_sorted_newline_terminated_records() {
    let data = map(&[("user456", "Bob"), ("user123", "Alice")]);
    assert_eq!(encode_snapshot(&data), b"user123=Alice\nuser456=Bob\n".to_vec());
}

#[test]
fn decode_splits_records_at_first_delimiter() {
    let decoded = decode_snapshot(b"expr=a=b\nempty=\n=novalue-key\n").unwrap();

    assert_eq!(decoded.skipped, 0);
    assert_eq!(decoded.data, map(&[("expr", "a=b"), ("empty", ""), ("", "novalue-key")]));
}

#[test]
fn decode_tolerates_missing_final_terminator_and_blank_lines() {
    let decoded = decode_snapshot(b"a=1\n\nb=2").unwrap();
    assert_eq!(decoded.data, map(&[("a", "1"), ("b", "2")]));
    assert_eq!(decoded.skipped, 0);
}

#[test]
fn decode_counts_skipped_records() {
    let decoded = decode_snapshot(b"a=1\nbogus\nb=2\nalso bogus\n").unwrap();
    assert_eq!(decoded.data.len(), 2);
    assert_eq!(decoded.skipped, 2);
}

#[test]
fn decode_rejects_payload_without_any_record() {
    assert!(matches!(
        decode_snapshot(b"bogus\n"),
        Err(Error::StateMachine(StateMachineError::MalformedSnapshot { skipped: 1 }))
    ));
    assert!(matches!(
        decode_snapshot(&[0xc3, 0x28]),
        Err(Error::StateMachine(StateMachineError::NonUtf8Snapshot))
    ));
}

#[test]
fn decode_of_empty_payload_is_empty_state() {
    assert_eq!(decode_snapshot(b"").unwrap(), DecodedSnapshot::default());
}

#[test]
fn later_duplicate_record_wins() {
    let decoded = decode_snapshot(b"k=old\nk=new\n").unwrap();
    assert_eq!(decoded.data.get("k").map(String::as_str), Some("new"));
}
