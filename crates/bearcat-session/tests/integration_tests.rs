//! Integration tests for scanner sessions
//!
//! These tests run complete dumps end to end, checking:
//! - Exact dump output for the version/model and frequency dumps
//! - Strict one-command-at-a-time exchanges
//! - Teardown (`EPG` then close) after every kind of failure
//! - The serial line transport against the virtual scanner task

use std::io::{self, ErrorKind as IoErrorKind};
use std::sync::{Arc, Mutex};

use bearcat_protocol::{ChannelIndex, Modulation, RawFrequency};
use bearcat_session::{
    run_dumps, run_frequency_dump, run_version_model_dump, Dump, ErrorKind, LineTransport,
    Session, SessionError, SessionState, Transport,
};
use bearcat_sim::{spawn_virtual_scanner, VirtualScanner, VirtualScannerConfig};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// Shared record of what a [`ScannerDouble`] saw, in order
    pub type Events = Arc<Mutex<Vec<String>>>;

    /// In-process transport answering from a virtual scanner
    ///
    /// Panics if a line is written while the previous reply is still unread,
    /// so any test driving it also checks that at most one command is ever
    /// outstanding.
    pub struct ScannerDouble {
        scanner: VirtualScanner,
        unread: Option<String>,
        events: Events,
        open: bool,
    }

    impl ScannerDouble {
        pub fn new(scanner: VirtualScanner) -> (Self, Events) {
            let events = Events::default();
            let double = Self {
                scanner,
                unread: None,
                events: events.clone(),
                open: true,
            };
            (double, events)
        }
    }

    impl Transport for ScannerDouble {
        async fn write_line(&mut self, line: &str) -> Result<(), SessionError> {
            assert!(
                self.unread.is_none(),
                "{:?} written while {:?} was still unread",
                line,
                self.unread
            );
            if !self.open {
                return Err(SessionError::Closed);
            }
            self.events.lock().unwrap().push(format!("write {}", line));
            self.unread = Some(self.scanner.respond(line));
            Ok(())
        }

        async fn read_line(&mut self) -> Result<String, SessionError> {
            self.unread
                .take()
                .ok_or_else(|| io::Error::new(IoErrorKind::UnexpectedEof, "no reply queued").into())
        }

        async fn close(&mut self) {
            self.events.lock().unwrap().push("close".to_string());
            self.open = false;
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    /// Scanner reporting model BC125AT and version 1.00
    pub fn scanner_v100() -> VirtualScanner {
        VirtualScanner::from_config(VirtualScannerConfig {
            model: "BC125AT".to_string(),
            version: "1.00".to_string(),
        })
    }

    pub fn index(i: u16) -> ChannelIndex {
        ChannelIndex::new(i).unwrap()
    }

    pub fn events(events: &Events) -> Vec<String> {
        events.lock().unwrap().clone()
    }

    /// The last two events are always `EPG` and a single close
    pub fn assert_torn_down(events: &[String]) {
        assert_eq!(
            &events[events.len() - 2..],
            &["write EPG".to_string(), "close".to_string()]
        );
        assert_eq!(events.iter().filter(|e| *e == "close").count(), 1);
        assert_eq!(events.iter().filter(|e| *e == "write EPG").count(), 1);
    }
}

use helpers::*;

// ============================================================================
// Version / model dump
// ============================================================================

#[tokio::test]
async fn test_version_model_dump_output() {
    let (double, log) = ScannerDouble::new(scanner_v100());
    let mut out = Vec::new();

    run_version_model_dump(double, &mut out).await.unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "# Model: BC125AT\n# Version: 1.00\n"
    );
    assert_eq!(
        events(&log),
        vec!["write PRG", "write MDL", "write VER", "write EPG", "close"]
    );
}

#[tokio::test]
async fn test_bad_answer_skips_rest_and_tears_down() {
    let mut scanner = scanner_v100();
    scanner.script_reply("MDL", "MDL");
    let (double, log) = ScannerDouble::new(scanner);
    let mut out = Vec::new();

    let err = run_version_model_dump(double, &mut out).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(out.is_empty());
    let events = events(&log);
    assert_eq!(events, vec!["write PRG", "write MDL", "write EPG", "close"]);
    assert_torn_down(&events);
}

#[tokio::test]
async fn test_rejected_prg_still_sends_epg() {
    let mut scanner = scanner_v100();
    scanner.script_reply("PRG", "PRG,NG");
    let (double, log) = ScannerDouble::new(scanner);
    let mut out = Vec::new();

    let err = run_version_model_dump(double, &mut out).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Mode);
    assert!(out.is_empty());
    assert_eq!(events(&log), vec!["write PRG", "write EPG", "close"]);
}

#[tokio::test]
async fn test_rejected_epg_is_reported_after_successful_reads() {
    let mut scanner = scanner_v100();
    scanner.script_reply("EPG", "EPG,NG");
    let (double, log) = ScannerDouble::new(scanner);
    let mut out = Vec::new();

    let err = run_version_model_dump(double, &mut out).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Mode);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "# Model: BC125AT\n# Version: 1.00\n"
    );
    assert_torn_down(&events(&log));
}

// ============================================================================
// Frequency dump
// ============================================================================

#[tokio::test]
async fn test_frequency_dump_suppresses_unused_channels() {
    let mut scanner = scanner_v100();
    let record = scanner.program(
        index(2),
        RawFrequency::parse("04625000").unwrap(),
        Modulation::Am,
    );
    record.delay = true;
    record.priority = true;

    let (double, log) = ScannerDouble::new(scanner);
    let mut out = Vec::new();
    run_frequency_dump(double, &mut out).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("#\n# Bank 1\n#\n1/1,462.5,AM,1,0,1\n#\n# Bank 2\n#\n"));
    assert!(text.ends_with("#\n# Bank 10\n#\n"));
    assert_eq!(text.matches("# Bank ").count(), 10);
    assert!(!text.contains("00000000"));

    let events = events(&log);
    assert_eq!(events.len(), 300 + 3);
    assert_eq!(events[0], "write PRG");
    assert_eq!(events[1], "write CIN,1");
    assert_eq!(events[300], "write CIN,300");
    assert_torn_down(&events);
}

#[tokio::test]
async fn test_frequency_dump_stops_at_malformed_channel() {
    let mut scanner = VirtualScanner::with_demo_channels();
    scanner.script_reply("CIN,5", "CIN,5,1,00462500,FM,,0,0,0");
    let (double, log) = ScannerDouble::new(scanner);
    let mut out = Vec::new();

    let err = run_frequency_dump(double, &mut out).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "#\n# Bank 1\n#\n1/0,162.4,FM,0,0,0\n1/1,162.425,FM,0,0,0\n1/2,162.55,FM,0,0,0\n"
    );

    let events = events(&log);
    assert!(!events.contains(&"write CIN,6".to_string()));
    assert_eq!(
        events,
        vec![
            "write PRG",
            "write CIN,1",
            "write CIN,2",
            "write CIN,3",
            "write CIN,4",
            "write CIN,5",
            "write EPG",
            "close",
        ]
    );
}

#[tokio::test]
async fn test_first_error_wins_over_teardown_error() {
    let mut scanner = VirtualScanner::with_demo_channels();
    scanner.script_reply("CIN,5", "CIN,5,1,00462500,FM,,0,0,0");
    scanner.script_reply("EPG", "EPG,NG");
    let (double, log) = ScannerDouble::new(scanner);
    let mut out = Vec::new();

    let err = run_frequency_dump(double, &mut out).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_ne!(err.kind(), ErrorKind::Mode);
    assert!(err.to_string().contains("CIN,5,1,00462500"));
    assert_torn_down(&events(&log));
}

#[tokio::test]
async fn test_dumps_run_in_requested_order() {
    let (double, log) = ScannerDouble::new(scanner_v100());
    let mut out = Vec::new();

    run_dumps(double, &[Dump::Frequencies, Dump::VersionModel], &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("#\n# Bank 1\n#\n"));
    assert!(text.ends_with("#\n# Bank 10\n#\n# Model: BC125AT\n# Version: 1.00\n"));

    let events = events(&log);
    assert_eq!(events[301], "write MDL");
    assert_eq!(events[302], "write VER");
    assert_torn_down(&events);
}

// ============================================================================
// Session over the double
// ============================================================================

#[tokio::test]
async fn test_channel_read_outside_programming_mode_is_refused_locally() {
    let (double, log) = ScannerDouble::new(scanner_v100());
    let mut session = Session::new(double);

    let err = session.read_channel(index(1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Sequence);
    assert!(events(&log).is_empty());

    session.close().await.unwrap();
    session.close().await.unwrap();
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(events(&log), vec!["close"]);
}

// ============================================================================
// Line transport against the virtual scanner task
// ============================================================================

#[tokio::test]
async fn test_full_frequency_dump_over_stream() {
    let (client, handle) = spawn_virtual_scanner(VirtualScanner::with_demo_channels());
    let mut out = Vec::new();

    run_frequency_dump(LineTransport::new("sim", client), &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    let expected = [
        "#",
        "# Bank 1",
        "#",
        "1/0,162.4,FM,0,0,0",
        "1/1,162.425,FM,0,0,0",
        "1/2,162.55,FM,0,0,0",
        "#",
        "# Bank 2",
        "#",
        "2/0,462.5625,FM,0,0,0",
        "2/1,462.5875,FM,0,0,0",
        "#",
        "# Bank 3",
        "#",
        "3/0,118.3,AM,1,0,0",
        "3/1,121.5,AM,0,0,1",
        "#",
        "# Bank 4",
        "#",
        "4/0,156.8,FM,0,0,0",
    ];
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(&lines[..expected.len()], &expected);
    assert_eq!(text.matches("# Bank ").count(), 10);

    let scanner = handle.await.unwrap().unwrap();
    let log = scanner.command_log();
    assert_eq!(log.len(), 300 + 2);
    assert_eq!(log.first().map(String::as_str), Some("PRG"));
    assert_eq!(log.last().map(String::as_str), Some("EPG"));
    assert!(!scanner.in_programming_mode());
}

#[tokio::test]
async fn test_version_model_dump_over_stream() {
    let (client, handle) = spawn_virtual_scanner(scanner_v100());
    let mut out = Vec::new();

    run_version_model_dump(LineTransport::new("sim", client), &mut out)
        .await
        .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "# Model: BC125AT\n# Version: 1.00\n"
    );
    let scanner = handle.await.unwrap().unwrap();
    assert_eq!(scanner.command_log(), &["PRG", "MDL", "VER", "EPG"]);
}

#[tokio::test]
async fn test_scanner_disappearing_mid_dump_is_io_error() {
    let (client, handle) = spawn_virtual_scanner(scanner_v100());
    handle.abort();
    let _ = handle.await;

    let mut out = Vec::new();
    let err = run_version_model_dump(LineTransport::new("sim", client), &mut out)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(out.is_empty());
}
