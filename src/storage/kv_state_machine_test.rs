use std::sync::Arc;
use std::thread;

use tracing_test::traced_test;

use super::*;
use crate::test_utils::EntryBuilder;
use crate::CommandError;
use crate::Error;
use crate::StateMachineError;

fn set(
    sm: &KvStateMachine,
    key: &str,
    value: &str,
) {
    let outcome = sm.apply(format!("SET {key} {value}").as_bytes());
    assert!(outcome.is_applied(), "{outcome:?}");
}

#[test]
fn apply_set_writes_key() {
    let sm = KvStateMachine::new("node1");

    let outcome = sm.apply(b"SET user123 Alice");
    assert_eq!(
        outcome,
        ApplyOutcome::Applied {
            key: "user123".to_string()
        }
    );
    assert_eq!(sm.get("user123").as_deref(), Some("Alice"));
    assert_eq!(sm.len(), 1);
}

#[test]
fn apply_overwrites_existing_value() {
    let sm = KvStateMachine::new("node1");
    set(&sm, "k", "v1");
    set(&sm, "k", "v2");

    assert_eq!(sm.get("k").as_deref(), Some("v2"));
    assert_eq!(sm.len(), 1);
}

#[test]
#[traced_test]
fn malformed_command_is_a_logged_no_op() {
    let sm = KvStateMachine::new("node1");
    set(&sm, "existing", "value");

    let outcome = sm.apply(b"SET onlykey");
    assert_eq!(
        outcome,
        ApplyOutcome::Skipped(StateMachineError::MalformedCommand {
            command: "SET onlykey".to_string(),
            source: CommandError::WrongArity {
                verb: "SET",
                expected: 3,
                actual: 2,
            },
        })
    );
    assert_eq!(sm.len(), 1);
    assert_eq!(sm.get("onlykey"), None);
    assert!(logs_contain("Invalid command skipped"));
}

#[test]
fn machine_stays_available_after_bad_commands() {
    let sm = KvStateMachine::new("node1");

    let bad_commands: [&[u8]; 5] = [b"DEL k", b"", b"SET a b c", b"set a b", &[0xff, 0x00]];
    for bad in bad_commands {
        assert!(matches!(sm.apply(bad), ApplyOutcome::Skipped(_)));
    }
    set(&sm, "after", "ok");

    assert_eq!(sm.len(), 1);
    assert_eq!(sm.get("after").as_deref(), Some("ok"));
}

#[test]
fn same_commands_reach_identical_state_on_every_replica() {
    let commands: Vec<String> = (0..200)
        .map(|i| match i % 7 {
            0 => format!("SET key{} broken", i % 13).replace(' ', "  "),
            _ => format!("SET key{} value{}", i % 13, i),
        })
        .collect();

    let replicas: Vec<KvStateMachine> = ["n1", "n2", "n3"].iter().map(|id| KvStateMachine::new(*id)).collect();
    for replica in &replicas {
        for command in &commands {
            let _ = replica.apply(command.as_bytes());
        }
    }

    let first = replicas[0].snapshot();
    assert!(!first.is_empty());
    for replica in &replicas[1..] {
        assert_eq!(replica.snapshot(), first);
    }
}

#[test]
fn snapshot_matches_wire_format() {
    let sm = KvStateMachine::new("node1");
    assert!(sm.apply(b"SET user123 Alice").is_applied());

    assert_eq!(sm.snapshot(), b"user123=Alice\n".to_vec());
}

#[test]
fn snapshot_of_empty_machine_is_empty() {
    let sm = KvStateMachine::new("node1");
    assert!(sm.snapshot().is_empty());
    assert!(sm.is_empty());
}

#[test]
fn restore_round_trips_snapshot() {
    let source = KvStateMachine::new("node1");
    set(&source, "user123", "Alice");
    set(&source, "user456", "Bob");
    set(&source, "expr", "a=b=c");
    set(&source, "blank", "");

    let target = KvStateMachine::new("node2");
    set(&target, "stale", "gone");

    let summary = target.restore(&source.snapshot()).unwrap();
    assert_eq!(
        summary,
        RestoreSummary {
            restored: 4,
            skipped: 0
        }
    );
    assert_eq!(target.get("user123").as_deref(), Some("Alice"));
    assert_eq!(target.get("user456").as_deref(), Some("Bob"));
    assert_eq!(target.get("expr").as_deref(), Some("a=b=c"));
    assert_eq!(target.get("blank").as_deref(), Some(""));
    assert_eq!(target.get("stale"), None);
    assert_eq!(target.snapshot(), source.snapshot());
}

#[test]
#[traced_test]
fn restore_skips_malformed_records() {
    let sm = KvStateMachine::new("node1");

    let summary = sm.restore(b"a=1\nnot-a-record\nb=2\n").unwrap();
    assert_eq!(summary.restored, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(sm.get("a").as_deref(), Some("1"));
    assert_eq!(sm.get("b").as_deref(), Some("2"));
    assert!(logs_contain("skipping snapshot record"));
}

#[test]
fn unparseable_restore_leaves_machine_empty() {
    let sm = KvStateMachine::new("node1");
    set(&sm, "stale", "value");

    let err = sm.restore(b"garbage\nmore garbage\n").unwrap_err();
    assert!(matches!(
        err,
        Error::StateMachine(StateMachineError::MalformedSnapshot { skipped: 2 })
    ));
    assert!(sm.is_empty());

    set(&sm, "stale", "value");
    let err = sm.restore(&[0xff, 0xfe, b'\n']).unwrap_err();
    assert!(matches!(err, Error::StateMachine(StateMachineError::NonUtf8Snapshot)));
    assert!(sm.is_empty());
}

#[test]
fn restore_of_empty_snapshot_clears_state() {
    let sm = KvStateMachine::new("node1");
    set(&sm, "k", "v");

    assert_eq!(sm.restore(b"").unwrap(), RestoreSummary::default());
    assert!(sm.is_empty());
}

#[test]
fn apply_entry_tracks_last_applied() {
    let sm = KvStateMachine::new("node1");
    let builder = EntryBuilder::new(1, 1);
    let (builder, e1) = builder.noop();
    let (builder, e2) = builder.set("user123", "Alice");
    let (builder, e3) = builder.config(b"add node4");
    let (_, e4) = builder.command(b"SET broken");

    assert_eq!(sm.apply_entry(&e1), ApplyOutcome::Ignored);
    assert!(sm.apply_entry(&e2).is_applied());
    assert_eq!(sm.apply_entry(&e3), ApplyOutcome::Ignored);
    assert!(matches!(sm.apply_entry(&e4), ApplyOutcome::Skipped(_)));

    assert_eq!(sm.last_applied(), LogId { index: 4, term: 1 });
    assert_eq!(sm.get("user123").as_deref(), Some("Alice"));
    assert_eq!(sm.len(), 1);
}

#[test]
fn apply_entry_skips_already_applied_index() {
    let sm = KvStateMachine::new("node1");
    let (builder, first) = EntryBuilder::new(1, 1).set("k", "v1");
    let (_, second) = builder.set("k", "v2");

    assert!(sm.apply_entry(&first).is_applied());
    assert!(sm.apply_entry(&second).is_applied());
    assert_eq!(sm.apply_entry(&first), ApplyOutcome::Ignored);

    assert_eq!(sm.get("k").as_deref(), Some("v2"));
    assert_eq!(sm.last_applied().index, 2);
}

#[test]
fn restore_resets_last_applied() {
    let sm = KvStateMachine::new("node1");
    let (_, entry) = EntryBuilder::new(7, 2).set("k", "v");
    assert!(sm.apply_entry(&entry).is_applied());

    sm.restore(b"k=v\n").unwrap();
    assert_eq!(sm.last_applied(), LogId::default());
}

#[test]
fn restore_at_skips_entries_covered_by_snapshot() {
    let source = KvStateMachine::new("node1");
    let (builder, e1) = EntryBuilder::new(1, 1).set("k", "v1");
    let (builder, e2) = builder.set("k", "v2");
    let (_, e3) = builder.set("k", "v3");
    assert!(source.apply_entry(&e1).is_applied());
    assert!(source.apply_entry(&e2).is_applied());

    let target = KvStateMachine::new("node2");
    target.restore_at(&source.snapshot(), e2.log_id()).unwrap();
    assert_eq!(target.last_applied(), LogId { index: 2, term: 1 });

    // Redelivery of an entry the snapshot already holds must not roll back
    assert_eq!(target.apply_entry(&e1), ApplyOutcome::Ignored);
    assert_eq!(target.get("k").as_deref(), Some("v2"));
    assert!(target.apply_entry(&e3).is_applied());
    assert_eq!(target.get("k").as_deref(), Some("v3"));
}

#[test]
fn failed_restore_at_resets_last_applied() {
    let sm = KvStateMachine::new("node1");

    assert!(sm.restore_at(b"garbage\n", LogId { index: 9, term: 2 }).is_err());
    assert_eq!(sm.last_applied(), LogId::default());
    assert!(sm.is_empty());
}

#[test]
fn snapshots_taken_during_writes_are_always_complete() {
    let sm = Arc::new(KvStateMachine::new("node1"));

    let writer = {
        let sm = sm.clone();
        thread::spawn(move || {
            for i in 0..1_000 {
                let _ = sm.apply(format!("SET k{i} v{i}").as_bytes());
            }
        })
    };

    for _ in 0..50 {
        let snapshot = sm.snapshot();
        let text = String::from_utf8(snapshot).unwrap();
        assert!(text.is_empty() || text.ends_with('\n'));
        for line in text.lines() {
            let (key, value) = line.split_once('=').unwrap();
            assert_eq!(&key[1..], &value[1..]);
        }
    }
    writer.join().unwrap();
    assert_eq!(sm.len(), 1_000);
}
