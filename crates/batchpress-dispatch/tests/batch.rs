// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch counting and printing against scripted handlers and real fixtures.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use batchpress_bridge::process::SystemProcessRunner;
use batchpress_bridge::{HelperCommand, ProcessOutput, ProcessRunner, office_session};
use batchpress_core::error::{BatchError, UnitError, UnitOutcome};
use batchpress_core::types::{
    ColorMode, DocumentFamily, DocumentFile, HelperFlavor, Outcome, PageRange, PrintChannel,
    PrintJobDescriptor, SkipReason,
};
use batchpress_core::{BatchConfig, UnitErrorKind};
use batchpress_dispatch::{
    BatchControl, BatchCounter, BatchPrinter, CancellationToken, HandlerRegistry, RetryPolicy,
    progress_channel,
};
use batchpress_handlers::DocumentHandler;

// ---------------------------------------------------------------------------
// Scripted handler
// ---------------------------------------------------------------------------

/// Behaviour is read from the file body:
/// a number is the page count, `corrupt` fails permanently, `flaky` is busy
/// for two attempts then has 4 pages, `busy` never succeeds, `timeout`
/// always runs past its deadline, and `cancel` raises the shared token
/// before reporting 1 page.
struct Scripted {
    name: &'static str,
    family: DocumentFamily,
    extensions: &'static [&'static str],
    channel: PrintChannel,
    attempts: Mutex<HashMap<PathBuf, u32>>,
    log: Arc<Mutex<Vec<String>>>,
    cancel: CancellationToken,
}

impl Scripted {
    fn new(
        name: &'static str,
        family: DocumentFamily,
        extensions: &'static [&'static str],
        channel: PrintChannel,
    ) -> Self {
        Self {
            name,
            family,
            extensions,
            channel,
            attempts: Mutex::new(HashMap::new()),
            log: Arc::new(Mutex::new(Vec::new())),
            cancel: CancellationToken::new(),
        }
    }

    fn with_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.log = log;
        self
    }

    fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn behave(&self, path: &Path) -> UnitOutcome<u32> {
        let attempt = {
            let mut attempts = self.attempts.lock().expect("lock");
            let n = attempts.entry(path.to_path_buf()).or_insert(0);
            *n += 1;
            *n
        };
        let body = std::fs::read_to_string(path).map_err(|e| UnitError::from_io(path, &e))?;
        match body.trim() {
            "corrupt" => Err(UnitError::Corrupt(path.display().to_string())),
            "flaky" if attempt <= 2 => Err(UnitError::TransientDevice("busy".into())),
            "flaky" => Ok(4),
            "busy" => Err(UnitError::TransientDevice("busy".into())),
            "timeout" => Err(UnitError::TimedOut {
                seconds: 30,
                detail: path.display().to_string(),
            }),
            "cancel" => {
                self.cancel.cancel();
                Ok(1)
            }
            n => n
                .parse()
                .map_err(|_| UnitError::UnsupportedSubformat(n.to_string())),
        }
    }
}

impl DocumentHandler for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn family(&self) -> DocumentFamily {
        self.family
    }

    fn extensions(&self) -> &[&'static str] {
        self.extensions
    }

    fn count(&self, path: &Path) -> UnitOutcome<u32> {
        self.behave(path)
    }

    fn print(&self, path: &Path, _job: &PrintJobDescriptor) -> UnitOutcome<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.log.lock().expect("lock").push(format!("{}:{name}", self.channel));
        std::thread::sleep(Duration::from_millis(2));
        self.behave(path).map(|_| ())
    }

    fn print_channel(&self) -> PrintChannel {
        self.channel.clone()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

fn scripted_registry(log: Arc<Mutex<Vec<String>>>, cancel: CancellationToken) -> Arc<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(
        Scripted::new("pdf", DocumentFamily::Pdf, &["pdf"], PrintChannel::PdfHelper)
            .with_log(Arc::clone(&log))
            .with_cancel(cancel.clone()),
    ));
    registry.register(Arc::new(
        Scripted::new("word", DocumentFamily::Word, &["docx"], PrintChannel::OfficeAutomation)
            .with_log(Arc::clone(&log))
            .with_cancel(cancel.clone()),
    ));
    registry.register(Arc::new(
        Scripted::new("text", DocumentFamily::Text, &["txt"], PrintChannel::TextSpooler)
            .with_log(log)
            .with_cancel(cancel),
    ));
    Arc::new(registry)
}

fn write_files(dir: &Path, registry: &HandlerRegistry, files: &[(&str, &str)]) -> Vec<DocumentFile> {
    files
        .iter()
        .map(|(name, body)| {
            let path = dir.join(name);
            std::fs::write(&path, body).expect("write fixture");
            registry.describe(path)
        })
        .collect()
}

fn counter(registry: Arc<HandlerRegistry>, concurrency: usize) -> BatchCounter {
    BatchCounter::new(registry, &BatchConfig::default())
        .expect("counter")
        .with_concurrency(concurrency)
        .expect("concurrency")
        .with_retry_policy(fast_policy())
}

fn printer(registry: Arc<HandlerRegistry>, concurrency: usize) -> BatchPrinter {
    BatchPrinter::new(registry, &BatchConfig::default())
        .expect("printer")
        .with_concurrency(concurrency)
        .expect("concurrency")
        .with_retry_policy(fast_policy())
}

fn failure_set(summary: &batchpress_core::BatchSummary) -> Vec<(String, UnitErrorKind)> {
    summary
        .failed_files
        .iter()
        .map(|(f, e)| (f.display_name(), e.kind()))
        .collect()
}

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mixed_batch_with_real_handlers() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_pdf(&dir.path().join("a.pdf"), 3);
    write_docx(&dir.path().join("b.docx"), 5);
    std::fs::write(dir.path().join("c.xyz"), b"whatever").expect("write");
    std::fs::write(dir.path().join("d.pdf"), b"%PDF-1.4 truncated nonsense").expect("write");

    let config = BatchConfig::default();
    let runner: Arc<dyn ProcessRunner> = Arc::new(SystemProcessRunner);
    let session = office_session(&config, Arc::clone(&runner));
    let registry = Arc::new(HandlerRegistry::with_defaults(&config, session, runner));

    let files: Vec<DocumentFile> = ["a.pdf", "b.docx", "c.xyz", "d.pdf"]
        .iter()
        .map(|n| registry.describe(dir.path().join(n)))
        .collect();

    let summary = counter(registry, 4)
        .run(&files, BatchControl::new())
        .await
        .expect("batch");

    assert_eq!(summary.family_total(DocumentFamily::Pdf), 3);
    assert_eq!(summary.family_total(DocumentFamily::Word), 5);
    assert_eq!(summary.total_units, 8);
    assert_eq!(failure_set(&summary), vec![("d.pdf".to_string(), UnitErrorKind::Corrupt)]);
    assert_eq!(summary.skipped_files.len(), 1);
    assert_eq!(summary.skipped_files[0].0.display_name(), "c.xyz");
    assert_eq!(summary.skipped_files[0].1, SkipReason::UnsupportedFormat);
    assert!(summary.is_complete());
    assert!(!summary.cancelled);
}

#[tokio::test]
async fn totals_do_not_depend_on_concurrency() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = scripted_registry(Arc::default(), CancellationToken::new());
    let mut fixtures = Vec::new();
    for i in 0..24 {
        let (name, body) = match i % 6 {
            0 => (format!("f{i}.pdf"), "3".to_string()),
            1 => (format!("f{i}.docx"), "7".to_string()),
            2 => (format!("f{i}.txt"), "1".to_string()),
            3 => (format!("f{i}.pdf"), "corrupt".to_string()),
            4 => (format!("f{i}.bin"), "0".to_string()),
            _ => (format!("f{i}.docx"), "0".to_string()),
        };
        fixtures.push((name, body));
    }
    let refs: Vec<(&str, &str)> = fixtures.iter().map(|(n, b)| (n.as_str(), b.as_str())).collect();
    let files = write_files(dir.path(), &registry, &refs);

    let serial = counter(Arc::clone(&registry), 1)
        .run(&files, BatchControl::new())
        .await
        .expect("serial");
    let parallel = counter(registry, 8)
        .run(&files, BatchControl::new())
        .await
        .expect("parallel");

    assert_eq!(serial.per_family_counts, parallel.per_family_counts);
    assert_eq!(failure_set(&serial), failure_set(&parallel));
    assert_eq!(serial.total_units, 4 * 3 + 4 * 7 + 4);
    for summary in [&serial, &parallel] {
        assert!(summary.is_complete());
        assert_eq!(summary.ok_count() + summary.failed_count() + summary.skipped_count(), 24);
        assert_eq!(summary.skipped_count(), 4);
        let order: Vec<usize> = summary.results.iter().map(|r| r.index()).collect();
        assert_eq!(order, (0..24).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn zero_pages_is_a_valid_count() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = scripted_registry(Arc::default(), CancellationToken::new());
    let files = write_files(dir.path(), &registry, &[("empty.docx", "0")]);

    let summary = counter(registry, 2).run(&files, BatchControl::new()).await.expect("batch");
    assert_eq!(summary.ok_count(), 1);
    assert_eq!(summary.results[0].count(), Some(0));
}

#[tokio::test]
async fn counting_twice_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = scripted_registry(Arc::default(), CancellationToken::new());
    let files = write_files(dir.path(), &registry, &[("a.pdf", "12"), ("b.txt", "2")]);

    let c = counter(registry, 2);
    let first = c.run(&files, BatchControl::new()).await.expect("first");
    let second = c.run(&files, BatchControl::new()).await.expect("second");
    assert_eq!(first.per_family_counts, second.per_family_counts);
    assert_ne!(first.batch_id, second.batch_id);
}

#[tokio::test]
async fn transient_failures_are_retried_within_bound() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = scripted_registry(Arc::default(), CancellationToken::new());
    let files = write_files(
        dir.path(),
        &registry,
        &[("flaky.pdf", "flaky"), ("busy.pdf", "busy"), ("bad.pdf", "corrupt")],
    );

    let summary = counter(registry, 3).run(&files, BatchControl::new()).await.expect("batch");

    let flaky = &summary.results[0];
    assert_eq!(flaky.outcome(), Outcome::Ok);
    assert_eq!(flaky.count(), Some(4));
    assert_eq!(flaky.attempts(), 3);

    let busy = &summary.results[1];
    assert_eq!(busy.outcome(), Outcome::Failed);
    assert_eq!(busy.attempts(), 3);
    assert_eq!(busy.error().map(UnitError::kind), Some(UnitErrorKind::TransientDevice));

    let bad = &summary.results[2];
    assert_eq!(bad.attempts(), 1);
    assert_eq!(summary.per_family_failures.get(&DocumentFamily::Pdf), Some(&2));
}

#[tokio::test]
async fn missing_and_oversized_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = scripted_registry(Arc::default(), CancellationToken::new());
    let mut files = write_files(dir.path(), &registry, &[("big.pdf", "123456789")]);
    files.push(registry.describe(dir.path().join("gone.pdf")));

    let config = BatchConfig {
        max_count_file_bytes: 4,
        ..Default::default()
    };
    let summary = BatchCounter::new(registry, &config)
        .expect("counter")
        .run(&files, BatchControl::new())
        .await
        .expect("batch");

    assert_eq!(
        summary.skipped_files[0].1,
        SkipReason::TooLarge { limit_bytes: 4 }
    );
    assert_eq!(failure_set(&summary), vec![("gone.pdf".to_string(), UnitErrorKind::Unreadable)]);
}

#[tokio::test]
async fn cancellation_skips_undispatched_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let token = CancellationToken::new();
    let registry = scripted_registry(Arc::default(), token.clone());
    let files = write_files(
        dir.path(),
        &registry,
        &[
            ("1.pdf", "2"),
            ("2.pdf", "corrupt"),
            ("3.pdf", "cancel"),
            ("4.pdf", "2"),
            ("5.pdf", "2"),
            ("6.pdf", "2"),
        ],
    );

    let control = BatchControl::new().with_cancellation(token);
    let summary = counter(registry, 1).run(&files, control).await.expect("batch");

    assert!(summary.cancelled);
    assert!(summary.is_complete());
    let outcomes: Vec<Outcome> = summary.results.iter().map(|r| r.outcome()).collect();
    assert_eq!(
        outcomes,
        vec![
            Outcome::Ok,
            Outcome::Failed,
            Outcome::Ok,
            Outcome::Skipped,
            Outcome::Skipped,
            Outcome::Skipped,
        ]
    );
    assert!(summary.skipped_files.iter().all(|(_, r)| *r == SkipReason::Cancelled));
    assert_eq!(summary.total_units, 3);
}

#[tokio::test]
async fn progress_reports_every_unit_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = scripted_registry(Arc::default(), CancellationToken::new());
    let bodies: Vec<(String, String)> = (0..10).map(|i| (format!("{i}.txt"), "1".to_string())).collect();
    let refs: Vec<(&str, &str)> = bodies.iter().map(|(n, b)| (n.as_str(), b.as_str())).collect();
    let mut files = write_files(dir.path(), &registry, &refs);
    files.push(registry.describe(dir.path().join("odd.xyz")));

    // Capacity 1 forces producers to wait on the consumer.
    let (tx, mut rx) = progress_channel(1);
    let consumer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(event) = rx.recv().await {
            tokio::time::sleep(Duration::from_millis(1)).await;
            seen.push(event);
        }
        seen
    });

    let summary = counter(registry, 4)
        .run(&files, BatchControl::new().with_progress(tx))
        .await
        .expect("batch");
    let events = consumer.await.expect("consumer");

    assert_eq!(events.len(), 11);
    let completed: Vec<usize> = events.iter().map(|e| e.completed).collect();
    assert_eq!(completed, (1..=11).collect::<Vec<_>>());
    assert!(events.iter().all(|e| e.total == 11 && e.batch_id == summary.batch_id));
    assert_eq!(
        events.iter().filter(|e| e.outcome == Outcome::Skipped).count(),
        1
    );
}

#[tokio::test]
async fn counting_timeouts_are_retried() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = scripted_registry(Arc::default(), CancellationToken::new());
    let files = write_files(dir.path(), &registry, &[("slow.pdf", "timeout"), ("a.pdf", "2")]);

    let summary = counter(registry, 2).run(&files, BatchControl::new()).await.expect("batch");
    assert_eq!(summary.results[0].attempts(), 3);
    assert_eq!(
        summary.results[0].error().map(UnitError::kind),
        Some(UnitErrorKind::TimedOut)
    );
    assert_eq!(summary.family_total(DocumentFamily::Pdf), 2);
}

#[tokio::test]
async fn zero_concurrency_is_rejected() {
    let registry = Arc::new(HandlerRegistry::new());
    let err = BatchCounter::new(Arc::clone(&registry), &BatchConfig::default())
        .expect("counter")
        .with_concurrency(0)
        .expect_err("zero");
    assert!(matches!(err, BatchError::InvalidConcurrency));

    let err = BatchPrinter::new(registry, &BatchConfig::default())
        .expect("printer")
        .with_concurrency(0)
        .expect_err("zero");
    assert!(matches!(err, BatchError::InvalidConcurrency));
}

#[tokio::test]
async fn empty_batch_is_complete() {
    let registry = scripted_registry(Arc::default(), CancellationToken::new());
    let summary = counter(registry, 2).run(&[], BatchControl::new()).await.expect("batch");
    assert_eq!(summary.total_files, 0);
    assert!(summary.is_complete());
    assert!(summary.finished_at.is_some());
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn each_channel_keeps_caller_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log: Arc<Mutex<Vec<String>>> = Arc::default();
    let registry = scripted_registry(Arc::clone(&log), CancellationToken::new());
    let names = [
        "w1.docx", "p1.pdf", "w2.docx", "t1.txt", "p2.pdf", "w3.docx", "p3.pdf", "t2.txt",
        "w4.docx", "p4.pdf",
    ];
    let fixtures: Vec<(&str, &str)> = names.iter().map(|n| (*n, "1")).collect();
    let files = write_files(dir.path(), &registry, &fixtures);

    let summary = printer(registry, 3)
        .run(&files, &PrintJobDescriptor::default(), BatchControl::new())
        .await
        .expect("batch");

    assert_eq!(summary.ok_count(), names.len());
    assert_eq!(summary.family_total(DocumentFamily::Word), 4);
    assert_eq!(summary.family_total(DocumentFamily::Pdf), 4);

    let log = log.lock().expect("lock").clone();
    let lane = |channel: &str| -> Vec<String> {
        log.iter()
            .filter_map(|entry| entry.strip_prefix(&format!("{channel}:")).map(str::to_string))
            .collect()
    };
    assert_eq!(lane("office-automation"), vec!["w1.docx", "w2.docx", "w3.docx", "w4.docx"]);
    assert_eq!(lane("pdf-helper"), vec!["p1.pdf", "p2.pdf", "p3.pdf", "p4.pdf"]);
    assert_eq!(lane("text-spooler"), vec!["t1.txt", "t2.txt"]);
}

#[tokio::test]
async fn print_failures_are_isolated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = scripted_registry(Arc::default(), CancellationToken::new());
    let files = write_files(
        dir.path(),
        &registry,
        &[("ok.pdf", "1"), ("flaky.pdf", "flaky"), ("bad.docx", "corrupt"), ("x.odt", "1")],
    );

    let summary = printer(registry, 2)
        .run(&files, &PrintJobDescriptor::default(), BatchControl::new())
        .await
        .expect("batch");

    assert!(summary.is_complete());
    assert_eq!(summary.ok_count(), 2);
    assert_eq!(summary.results[1].attempts(), 3);
    assert_eq!(failure_set(&summary), vec![("bad.docx".to_string(), UnitErrorKind::Corrupt)]);
    assert_eq!(summary.skipped_files[0].1, SkipReason::UnsupportedFormat);
}

#[tokio::test]
async fn print_timeout_fails_only_that_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log: Arc<Mutex<Vec<String>>> = Arc::default();
    let registry = scripted_registry(Arc::clone(&log), CancellationToken::new());
    let files = write_files(
        dir.path(),
        &registry,
        &[("a.pdf", "1"), ("slow.pdf", "timeout"), ("c.pdf", "1"), ("d.docx", "1")],
    );

    let summary = printer(registry, 2)
        .run(&files, &PrintJobDescriptor::default(), BatchControl::new())
        .await
        .expect("batch");

    assert!(summary.is_complete());
    assert_eq!(summary.ok_count(), 3);
    assert_eq!(failure_set(&summary), vec![("slow.pdf".to_string(), UnitErrorKind::TimedOut)]);
    assert_eq!(summary.results[1].attempts(), 1);
    let submissions = log.lock().expect("lock").iter().filter(|l| l.ends_with("slow.pdf")).count();
    assert_eq!(submissions, 1);
}

/// Office suite plus `lp`: conversions write a stub PDF into `--outdir`,
/// and the invocation numbered `busy_on` (1-based) reports a busy printer.
struct Spooler {
    busy_on: usize,
    calls: Mutex<Vec<(String, bool)>>,
}

impl ProcessRunner for Spooler {
    fn run(&self, command: &HelperCommand, _timeout: Duration) -> UnitOutcome<ProcessOutput> {
        let mut calls = self.calls.lock().expect("lock");
        let accepted = calls.len() + 1 != self.busy_on;
        calls.push((command.to_string(), accepted));
        if !accepted {
            return Ok(ProcessOutput {
                code: Some(1),
                stderr: "lp: printer is busy".into(),
                ..Default::default()
            });
        }
        if let Some(at) = command.args.iter().position(|a| a == "--outdir") {
            let source = Path::new(command.args.last().expect("source"));
            let mut name = source.file_stem().expect("stem").to_os_string();
            name.push(".pdf");
            std::fs::write(Path::new(&command.args[at + 1]).join(name), b"%PDF-1.4\n%%EOF\n")
                .expect("render");
        }
        Ok(ProcessOutput {
            code: Some(0),
            ..Default::default()
        })
    }
}

#[tokio::test]
async fn busy_printer_retry_does_not_duplicate_office_copies() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_docx(&dir.path().join("report.docx"), 3);

    let config = BatchConfig {
        office_program: "soffice".into(),
        print_helper: "lp".into(),
        print_helper_flavor: HelperFlavor::Cups,
        ..Default::default()
    };
    // Call 1 renders the document, call 2 is its first submission.
    let spooler = Arc::new(Spooler {
        busy_on: 2,
        calls: Mutex::new(Vec::new()),
    });
    let runner: Arc<dyn ProcessRunner> = Arc::clone(&spooler) as Arc<dyn ProcessRunner>;
    let session = office_session(&config, Arc::clone(&runner));
    let registry = Arc::new(HandlerRegistry::with_defaults(&config, session, runner));
    let files = vec![registry.describe(dir.path().join("report.docx"))];

    let job = PrintJobDescriptor {
        copies: 2,
        color_mode: ColorMode::Color,
        page_range: PageRange::parse("1-2").expect("range"),
        ..Default::default()
    };
    let summary = BatchPrinter::new(registry, &config)
        .expect("printer")
        .with_retry_policy(fast_policy())
        .run(&files, &job, BatchControl::new())
        .await
        .expect("batch");

    assert_eq!(summary.results[0].outcome(), Outcome::Ok);
    assert_eq!(summary.results[0].attempts(), 2);

    let calls = spooler.calls.lock().expect("lock");
    let accepted: Vec<&String> = calls
        .iter()
        .filter(|(line, ok)| *ok && line.starts_with("lp "))
        .map(|(line, _)| line)
        .collect();
    assert_eq!(accepted.len(), 1);
    let line = accepted[0];
    assert!(line.contains("-n 2"));
    assert!(line.contains("sides=two-sided-long-edge"));
    assert!(line.contains("media=A4"));
    assert!(line.contains("print-color-mode=color"));
    assert!(line.contains("page-ranges=1-2"));
    assert!(line.ends_with("report.pdf"));
}

#[tokio::test]
async fn invalid_job_fails_the_call() {
    let registry = scripted_registry(Arc::default(), CancellationToken::new());
    let job = PrintJobDescriptor {
        copies: 0,
        ..Default::default()
    };
    let err = printer(registry, 1)
        .run(&[], &job, BatchControl::new())
        .await
        .expect_err("copies = 0");
    assert!(matches!(err, BatchError::InvalidJob(_)));
}

#[tokio::test]
async fn cancelled_print_submits_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log: Arc<Mutex<Vec<String>>> = Arc::default();
    let registry = scripted_registry(Arc::clone(&log), CancellationToken::new());
    let files = write_files(dir.path(), &registry, &[("a.pdf", "1"), ("b.docx", "1"), ("c.txt", "1")]);

    let token = CancellationToken::new();
    token.cancel();
    let summary = printer(registry, 2)
        .run(
            &files,
            &PrintJobDescriptor::default(),
            BatchControl::new().with_cancellation(token),
        )
        .await
        .expect("batch");

    assert!(summary.cancelled);
    assert_eq!(summary.skipped_count(), 3);
    assert!(log.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn cancel_mid_lane_keeps_finished_outcomes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let token = CancellationToken::new();
    let registry = scripted_registry(Arc::default(), token.clone());
    let files = write_files(
        dir.path(),
        &registry,
        &[("1.docx", "1"), ("2.docx", "cancel"), ("3.docx", "1"), ("4.docx", "1")],
    );

    let summary = printer(registry, 1)
        .run(
            &files,
            &PrintJobDescriptor::default(),
            BatchControl::new().with_cancellation(token),
        )
        .await
        .expect("batch");

    let outcomes: Vec<Outcome> = summary.results.iter().map(|r| r.outcome()).collect();
    assert_eq!(
        outcomes,
        vec![Outcome::Ok, Outcome::Ok, Outcome::Skipped, Outcome::Skipped]
    );
    assert!(summary.cancelled);
}

// ---------------------------------------------------------------------------
// On-disk fixtures
// ---------------------------------------------------------------------------

fn write_pdf(path: &Path, pages: u32) {
    use lopdf::{Document, Object, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => i64::from(pages),
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save pdf");
}

fn write_docx(path: &Path, pages: u32) {
    let mut writer = zip::ZipWriter::new(File::create(path).expect("create"));
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("word/document.xml", options).expect("start");
    writer.write_all(b"<w:document/>").expect("write");
    writer.start_file("docProps/app.xml", options).expect("start");
    write!(writer, "<Properties><Pages>{pages}</Pages></Properties>").expect("write");
    writer.finish().expect("finish");
}
