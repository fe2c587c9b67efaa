//! Acquisition lifecycle integration tests.
//!
//! These drive the pipeline with the real filesystem transferer:
//! - Ledger seeding from a sequence descriptor across invocations
//! - Source cleanup under each removal policy
//! - Recovery from an interrupted earlier transfer
//! - Serialization of overlapping invocations on one directory

use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use rawsync_core::{
    lock::lock_path_for,
    testing::{fixtures, MockTransferer},
    AcquisitionPipeline, DirectoryLock, FsTransferer, Ledger, Outcome, PipelineError,
};

const DATA_LEN: usize = 256;

/// A source run under `<temp>/Data/Transfer/Run1` mapped to `<temp>/out`.
struct Harness {
    temp: TempDir,
    source: PathBuf,
    out: PathBuf,
}

impl Harness {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let source = temp.path().join("Data").join("Transfer").join("Run1");
        let out = temp.path().join("out");
        std::fs::create_dir_all(&source).expect("Failed to create source dir");
        fixtures::write_descriptor(&source, "Run1.csv", &["S1", "S2", "PostBlank_01"])
            .expect("Failed to write descriptor");
        Self { temp, source, out }
    }

    fn pipeline(&self, extra: &str) -> AcquisitionPipeline<FsTransferer> {
        let extra = format!("Min_File_Size_To_Retransfer=100\n{extra}");
        AcquisitionPipeline::new(
            fixtures::config_with(&self.out, &extra),
            FsTransferer::with_defaults(),
        )
    }

    fn acquire(&self, name: &str) -> PathBuf {
        fixtures::write_data_file(&self.source, name, DATA_LEN).expect("Failed to write data");
        self.source.join(name)
    }

    fn destination(&self) -> PathBuf {
        self.out.join("Run1")
    }

    async fn complete_run(&self, pipeline: &AcquisitionPipeline<FsTransferer>) -> Outcome {
        self.acquire("PostBlank_01.raw");
        let first = pipeline.run(&self.acquire("S1.raw")).await.unwrap();
        assert!(matches!(first, Outcome::Pending { remaining: 1 }));
        pipeline.run(&self.acquire("S2.raw")).await.unwrap()
    }
}

fn assert_exists(path: &Path) {
    assert!(path.exists(), "expected {} to exist", path.display());
}

#[tokio::test]
async fn test_sequence_lifecycle_with_descriptor() {
    let harness = Harness::new();
    let pipeline = harness.pipeline("");

    let blank = harness.acquire("PostBlank_01.raw");
    let outcome = pipeline.run(&blank).await.unwrap();
    assert!(matches!(outcome, Outcome::ControlFileIgnored { .. }));
    assert!(!harness.source.join("AcquisitionLedger.txt").exists());

    let outcome = pipeline.run(&harness.acquire("S1.raw")).await.unwrap();
    assert!(matches!(outcome, Outcome::Pending { remaining: 1 }));

    let ledger = Ledger::load(&harness.source.join("AcquisitionLedger.txt")).unwrap();
    assert_eq!(ledger.len(), 2);
    assert!(!ledger.is_complete());
    assert!(!harness.destination().exists());

    let outcome = pipeline.run(&harness.acquire("S2.raw")).await.unwrap();
    let Outcome::Transferred(report) = outcome else {
        panic!("expected a transfer, got {outcome:?}");
    };

    assert_eq!(report.destination, harness.destination());
    assert!(!report.purged_previous);
    assert!(!report.repeat_run);
    for name in ["S1.raw", "S2.raw", "PostBlank_01.raw", "Run1.csv", "MSAComplete.txt"] {
        assert_exists(&harness.destination().join(name));
    }

    let marker = std::fs::read_to_string(harness.destination().join("MSAComplete.txt")).unwrap();
    assert!(marker.contains("raw_file=\"S2.raw\""));
    assert!(marker.contains("repeat_run=\"false\""));

    // Nothing removed by default.
    assert_exists(&harness.source.join("S1.raw"));
}

#[tokio::test]
async fn test_unknown_trigger_is_rejected() {
    let harness = Harness::new();
    let pipeline = harness.pipeline("");

    pipeline.run(&harness.acquire("S1.raw")).await.unwrap();
    let err = pipeline.run(&harness.acquire("S9.raw")).await.unwrap_err();

    assert!(matches!(err, PipelineError::TriggerNotInManifest { .. }));
    let ledger = Ledger::load(&harness.source.join("AcquisitionLedger.txt")).unwrap();
    assert_eq!(ledger.pending().collect::<Vec<_>>(), vec!["s2"]);
}

#[tokio::test]
async fn test_keep_files_ignores_other_removal_flags() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(
        "Remove_Files=false\nRemove_Directories=true\nPreserve_Manifest=false\n",
    );
    std::fs::create_dir_all(harness.source.join("Methods")).unwrap();

    let outcome = harness.complete_run(&pipeline).await;
    let Outcome::Transferred(report) = outcome else {
        panic!("expected a transfer, got {outcome:?}");
    };

    assert_eq!(report.files_removed, 0);
    assert_eq!(report.directories_removed, 0);
    for name in [
        "S1.raw",
        "S2.raw",
        "PostBlank_01.raw",
        "Run1.csv",
        "AcquisitionLedger.txt",
        "Methods",
    ] {
        assert_exists(&harness.source.join(name));
    }
    assert_exists(&harness.destination().join("S1.raw"));
}

#[tokio::test]
async fn test_remove_files_preserving_manifest() {
    let harness = Harness::new();
    let pipeline = harness.pipeline("Remove_Files=true\nRemove_Directories=true\n");

    let outcome = harness.complete_run(&pipeline).await;
    let Outcome::Transferred(report) = outcome else {
        panic!("expected a transfer, got {outcome:?}");
    };

    assert_eq!(report.directories_removed, 0);
    assert!(!harness.source.join("S1.raw").exists());
    assert!(!harness.source.join("AcquisitionLedger.txt").exists());
    assert_exists(&harness.source.join("Run1.csv"));
    assert_exists(&harness.destination().join("S1.raw"));
}

#[tokio::test]
async fn test_remove_files_and_manifest_keeps_directories() {
    let harness = Harness::new();
    let pipeline = harness.pipeline("Remove_Files=true\nPreserve_Manifest=false\n");
    std::fs::create_dir_all(harness.source.join("Methods")).unwrap();
    std::fs::write(harness.source.join("Methods").join("m.meth"), b"method").unwrap();

    harness.complete_run(&pipeline).await;

    assert_exists(&harness.source);
    assert_exists(&harness.source.join("Methods"));
    assert!(!harness.source.join("Methods").join("m.meth").exists());
    assert!(!harness.source.join("Run1.csv").exists());
    assert_exists(&harness.destination().join("Methods").join("m.meth"));
}

#[tokio::test]
async fn test_remove_everything() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(
        "Remove_Files=true\nRemove_Directories=true\nPreserve_Manifest=false\n",
    );
    std::fs::create_dir_all(harness.source.join("Methods")).unwrap();
    let lock_file = lock_path_for(&harness.source);

    let outcome = harness.complete_run(&pipeline).await;
    let Outcome::Transferred(report) = outcome else {
        panic!("expected a transfer, got {outcome:?}");
    };

    assert!(!harness.source.exists());
    assert!(!lock_file.exists());
    assert_eq!(report.directories_removed, 2);
    assert_exists(&harness.destination().join("Run1.csv"));
}

#[tokio::test]
async fn test_retrigger_purges_interrupted_transfer() {
    let harness = Harness::new();
    let pipeline = harness.pipeline("");
    harness.complete_run(&pipeline).await;

    // Simulate a copy that died halfway through S1 and left a stray file.
    let dest = harness.destination();
    std::fs::write(dest.join("S1.raw"), b"partial").unwrap();
    std::fs::write(dest.join("stray.tmp"), b"x").unwrap();

    let outcome = pipeline.run(&harness.source.join("S2.raw")).await.unwrap();
    let Outcome::Transferred(report) = outcome else {
        panic!("expected a transfer, got {outcome:?}");
    };

    assert!(report.purged_previous);
    assert!(!dest.join("stray.tmp").exists());
    let restored = std::fs::metadata(dest.join("S1.raw")).unwrap();
    assert_eq!(restored.len(), DATA_LEN as u64);
}

#[tokio::test]
async fn test_rerun_skips_existing_files() {
    let harness = Harness::new();
    let pipeline = harness.pipeline("");
    harness.complete_run(&pipeline).await;

    let outcome = pipeline.run(&harness.source.join("S2.raw")).await.unwrap();
    let Outcome::Transferred(report) = outcome else {
        panic!("expected a transfer, got {outcome:?}");
    };

    assert!(!report.purged_previous);
    assert!(report.files_skipped > 0);
}

#[tokio::test]
async fn test_repeat_run_marker() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("Transfer").join("Run1_RPT");
    let out = temp.path().join("out");
    fixtures::write_data_file(&source, "S1.raw", DATA_LEN).unwrap();

    let pipeline = AcquisitionPipeline::new(fixtures::config(&out), FsTransferer::with_defaults())
        .with_sequence_override(vec!["S1".to_string()]);
    let outcome = pipeline.run(&source.join("S1.raw")).await.unwrap();
    let Outcome::Transferred(report) = outcome else {
        panic!("expected a transfer, got {outcome:?}");
    };

    assert!(report.repeat_run);
    let marker = std::fs::read_to_string(out.join("Run1_RPT").join("MSAComplete.txt")).unwrap();
    assert!(marker.contains("repeat_run=\"true\""));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_overlapping_invocations_wait_for_lock() {
    let harness = Harness::new();
    let trigger = harness.acquire("S1.raw");
    let transferer = MockTransferer::new();
    let pipeline = AcquisitionPipeline::new(fixtures::config(&harness.out), transferer);

    let mut held = DirectoryLock::for_directory(&harness.source).unwrap();
    let guard = held.acquire().unwrap();

    let task = tokio::spawn(async move { pipeline.run(&trigger).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!task.is_finished());
    assert!(!harness.source.join("AcquisitionLedger.txt").exists());

    drop(guard);
    let outcome = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("invocation did not resume after the lock was released")
        .unwrap()
        .unwrap();
    assert!(matches!(outcome, Outcome::Pending { remaining: 1 }));
}
