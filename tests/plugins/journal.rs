use aki::core::collaborators::LogSink;
use aki::core::config::AkiConfig;
use aki::core::context::ConversationState;
use aki::core::error::AkiError;
use aki::core::pipeline::Pipeline;
use aki::core::record::{LogBody, LogEntry};
use aki::plugins::journal::{Journal, RECENT_CAPACITY, reveal};
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn query(text: &str, persona: &str) -> LogEntry {
    LogEntry {
        timestamp: "2026-02-16T05:43:12Z".to_string(),
        body: LogBody::Query {
            query: text.to_string(),
            persona: persona.to_string(),
            tone: "neutral".to_string(),
            output_type: "based".to_string(),
            commands: Vec::new(),
        },
    }
}

#[test]
fn obfuscated_journal_round_trips() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("logs").join("aki.log");
    let journal = Journal::open(&path, true).expect("open");

    let entries = vec![
        query("what is habitus", "akademik"),
        LogEntry::event("session_start", json!({ "session": "01J" })),
        LogEntry::error("generate", "offline", json!(null)),
    ];
    for e in &entries {
        journal.append(e).expect("append");
    }

    let raw = fs::read_to_string(&path).expect("read raw");
    assert_eq!(raw.lines().count(), 3);
    assert!(!raw.contains("habitus"));
    for line in raw.lines() {
        assert!(line.chars().all(|c| c.is_ascii_hexdigit()), "{}", line);
        let plain = reveal(line).expect("decodes");
        assert!(plain.starts_with('{'));
    }

    let read_back = journal.read(None).expect("read");
    assert_eq!(read_back, entries);
    assert_eq!(journal.read(Some(1)).expect("read last").len(), 1);
}

#[test]
fn plain_journal_is_json_lines() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("aki.log");
    let journal = Journal::open(&path, false).expect("open");
    journal.append(&query("hello", "core")).expect("append");

    let raw = fs::read_to_string(&path).expect("read raw");
    let value: serde_json::Value = serde_json::from_str(raw.trim()).expect("json line");
    assert_eq!(value["type"], "query");
    assert_eq!(value["query"], "hello");
    assert_eq!(value["persona"], "core");
    assert_eq!(value["output_type"], "based");
}

#[test]
fn journal_stays_readable_when_mode_changes() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("aki.log");
    Journal::open(&path, false)
        .expect("open plain")
        .append(&query("first", "core"))
        .expect("append plain");
    Journal::open(&path, true)
        .expect("open obfuscated")
        .append(&query("second", "lawyer"))
        .expect("append obfuscated");

    for encrypted in [true, false] {
        let entries = Journal::open(&path, encrypted)
            .expect("reopen")
            .read(None)
            .expect("read");
        assert_eq!(entries.len(), 2);
    }
}

#[test]
fn undecodable_lines_are_skipped() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("aki.log");
    let journal = Journal::open(&path, true).expect("open");
    journal.append(&query("kept", "core")).expect("append");
    let mut raw = fs::read_to_string(&path).expect("read");
    raw.push_str("not hex at all\n\n{\"broken\": \n");
    fs::write(&path, raw).expect("write");
    journal.append(&query("also kept", "core")).expect("append");

    let entries = journal.read(None).expect("read");
    assert_eq!(entries.len(), 2);
}

#[test]
fn search_and_stats() {
    let tmp = tempdir().expect("tempdir");
    let journal = Journal::open(tmp.path().join("aki.log"), true).expect("open");
    journal.append(&query("Tell me about Bourdieu", "akademik")).expect("a");
    journal.append(&query("and habitus?", "akademik")).expect("b");
    journal.append(&query("contract law", "lawyer")).expect("c");
    journal
        .append(&LogEntry::event("threat_blocked", json!({ "score": 0.875 })))
        .expect("d");

    let hits = journal.search("bourdieu").expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(journal.search("THREAT_BLOCKED").expect("search").len(), 1);
    assert!(journal.search("nothing like this").expect("search").is_empty());

    let stats = journal.stats().expect("stats");
    assert_eq!(stats.total_entries, 4);
    assert_eq!(stats.by_type.get("query"), Some(&3));
    assert_eq!(stats.by_type.get("event"), Some(&1));
    assert_eq!(stats.by_persona.get("akademik"), Some(&2));
    assert_eq!(stats.by_persona.get("lawyer"), Some(&1));
    assert_eq!(stats.first.as_deref(), Some("2026-02-16T05:43:12Z"));
    let last = stats.last.expect("last timestamp");
    assert!(
        chrono::DateTime::parse_from_rfc3339(&last).is_ok(),
        "journal timestamp {:?} is not ISO-8601",
        last
    );
}

#[test]
fn export_writes_decoded_array() {
    let tmp = tempdir().expect("tempdir");
    let journal = Journal::open(tmp.path().join("aki.log"), true).expect("open");
    journal.append(&query("one", "core")).expect("append");
    journal.append(&query("two", "core")).expect("append");

    let dest = tmp.path().join("export.json");
    assert_eq!(journal.export(&dest).expect("export"), 2);
    let exported: Vec<LogEntry> =
        serde_json::from_str(&fs::read_to_string(&dest).expect("read")).expect("json array");
    assert_eq!(exported, journal.read(None).expect("read"));
}

#[test]
fn clear_requires_confirmation() {
    let tmp = tempdir().expect("tempdir");
    let journal = Journal::open(tmp.path().join("aki.log"), true).expect("open");
    journal.append(&query("keep me", "core")).expect("append");

    let err = journal.clear(false).unwrap_err();
    assert!(matches!(err, AkiError::ValidationError(_)));
    assert_eq!(journal.read(None).expect("read").len(), 1);

    journal.clear(true).expect("clear");
    assert!(journal.read(None).expect("read").is_empty());
    assert!(journal.recent(10).is_empty());
}

#[test]
fn recent_ring_keeps_the_newest_entries() {
    let tmp = tempdir().expect("tempdir");
    let journal = Journal::open(tmp.path().join("aki.log"), false).expect("open");
    for i in 0..RECENT_CAPACITY + 5 {
        journal.append(&query(&format!("turn {}", i), "core")).expect("append");
    }

    let all = journal.recent(usize::MAX);
    assert_eq!(all.len(), RECENT_CAPACITY);
    assert!(all[0].ends_with("turn 5"));
    let last = journal.recent(2);
    assert_eq!(last.len(), 2);
    assert!(last[1].ends_with(&format!("turn {}", RECENT_CAPACITY + 4)));
    assert!(last[1].contains("QUERY (core)"));
}

#[test]
fn journal_follows_config_paths() {
    let tmp = tempdir().expect("tempdir");
    let config = AkiConfig::default().rebase(&tmp.path().join("aki.toml"));
    let journal = Journal::from_config(&config).expect("from config");
    assert_eq!(journal.path(), tmp.path().join("aki.log"));
    assert!(journal.is_encrypted());

    let turn = Pipeline::default().process_turn(">find< /akademik hi", &ConversationState::new());
    journal.append(&turn.query_record()).expect("append");
    let entries = journal.read(None).expect("read");
    assert_eq!(entries[0].persona(), Some("akademik"));
}
