use std::path::Path;
use std::time::{Duration, Instant};

use binscan::triage::{
    Analyzer, ExecutableMetadata, ReputationVerdict, SignatureMatchSet, TypeDescription,
    VerdictReason,
};
use binscan::{sha256_digest, ScanConfig, ScanError};

use crate::common::{
    create_temp_file, pe, FixedReputation, FixedSignatures, FixedType, StalledReputation,
};

fn config_with_apis(apis: &[&str]) -> ScanConfig {
    ScanConfig {
        suspicious_api_substrings: apis.iter().map(|s| s.to_string()).collect(),
        ..ScanConfig::default()
    }
}

fn quiet_analyzer(
    config: ScanConfig,
) -> Analyzer<FixedSignatures, FixedReputation, FixedType> {
    Analyzer::with_collectors(
        config,
        FixedSignatures(SignatureMatchSet::Matched(vec![])),
        FixedReputation(ReputationVerdict::Clean),
        FixedType(TypeDescription::Described("data".to_string())),
    )
    .unwrap()
}

#[tokio::test]
async fn suspicious_import_marks_pe_malicious() {
    let image = pe::with_imports("KERNEL32.dll", &["CreateFileA", "VirtualAllocEx"]);
    let file = create_temp_file(&image);
    let analyzer = quiet_analyzer(config_with_apis(&["VirtualAllocEx"]));

    let report = analyzer.analyze(file.path(), "dropper.exe").await.unwrap();

    assert_eq!(report.file_name(), "dropper.exe");
    assert_eq!(*report.sha256(), sha256_digest(&image));
    match report.pe_analysis() {
        ExecutableMetadata::RecognizedImage(meta) => {
            assert_eq!(meta.imports, vec!["CreateFileA", "VirtualAllocEx"]);
            assert_eq!(meta.libraries, vec!["KERNEL32.dll"]);
            assert_eq!(meta.machine, "i386");
            assert_eq!(meta.sections, vec![".idata"]);
        }
        other => panic!("expected a recognized image, got {other:?}"),
    }
    assert!(report.malicious());
    assert_eq!(
        report.verdict_reasons(),
        [VerdictReason::SuspiciousImports {
            imports: vec!["VirtualAllocEx".to_string()]
        }]
    );
}

#[tokio::test]
async fn benign_imports_stay_clean() {
    let image = pe::with_imports("KERNEL32.dll", &["CreateFileA", "ReadFile"]);
    let file = create_temp_file(&image);
    let analyzer = quiet_analyzer(config_with_apis(&["VirtualAllocEx", "WriteProcessMemory"]));

    let report = analyzer.analyze(file.path(), "tool.exe").await.unwrap();

    assert_eq!(report.pe_analysis().imports(), ["CreateFileA", "ReadFile"]);
    assert!(!report.malicious());
    assert!(report.verdict_reasons().is_empty());
}

#[tokio::test]
async fn all_zero_file_is_not_recognized() {
    let file = create_temp_file(&[0u8; 4096]);
    let analyzer = quiet_analyzer(ScanConfig::default());

    let report = analyzer.analyze(file.path(), "zeros.bin").await.unwrap();

    assert!(report.strings().is_empty());
    assert!(!report.pe_analysis().is_recognized());
    assert!(!report.malicious());
}

#[tokio::test]
async fn text_file_reports_every_prefix() {
    let file = create_temp_file(b"Hello\n");
    let analyzer = quiet_analyzer(ScanConfig::default());

    let report = analyzer.analyze(file.path(), "hello.txt").await.unwrap();

    let texts: Vec<&str> = report.strings().iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["Hell", "Hello", "ello"]);
    assert_eq!(
        report.sha256().to_hex(),
        "66a045b452102c59d840ec097d59d9467e13a3f34f6494e539ffd32c1bb35f18"
    );
    assert!(!report.malicious());
}

#[tokio::test]
async fn empty_file_is_analyzed() {
    let file = create_temp_file(b"");
    let analyzer = quiet_analyzer(ScanConfig::default());

    let report = analyzer.analyze(file.path(), "empty").await.unwrap();

    assert_eq!(
        report.sha256().to_hex(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert!(report.strings().is_empty());
    assert!(!report.pe_analysis().is_recognized());
}

#[tokio::test]
async fn repeated_runs_produce_identical_reports() {
    let image = pe::with_imports("KERNEL32.dll", &["CreateFileA"]);
    let file = create_temp_file(&image);
    let analyzer = quiet_analyzer(config_with_apis(&["CreateFile"]));

    let first = analyzer.analyze(file.path(), "same.exe").await.unwrap();
    let second = analyzer.analyze(file.path(), "same.exe").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[tokio::test]
async fn any_clause_alone_raises_the_verdict() {
    let file = create_temp_file(b"plain data, nothing to see");

    let by_signature = Analyzer::with_collectors(
        ScanConfig::default(),
        FixedSignatures(SignatureMatchSet::Matched(vec!["Evil_Rule".to_string()])),
        FixedReputation(ReputationVerdict::Clean),
        FixedType(TypeDescription::Described("ASCII text".to_string())),
    )
    .unwrap();
    let report = by_signature.analyze(file.path(), "a").await.unwrap();
    assert!(report.malicious());

    let by_reputation = Analyzer::with_collectors(
        ScanConfig::default(),
        FixedSignatures(SignatureMatchSet::Matched(vec![])),
        FixedReputation(ReputationVerdict::Infected),
        FixedType(TypeDescription::Described("ASCII text".to_string())),
    )
    .unwrap();
    let report = by_reputation.analyze(file.path(), "b").await.unwrap();
    assert!(report.malicious());
    assert_eq!(report.verdict_reasons(), [VerdictReason::ReputationInfected]);
}

#[tokio::test]
async fn unavailable_signals_do_not_raise_the_verdict() {
    let file = create_temp_file(b"plain data, nothing to see");
    let analyzer = Analyzer::with_collectors(
        ScanConfig::default(),
        FixedSignatures(SignatureMatchSet::unavailable("'yara' command not found")),
        FixedReputation(ReputationVerdict::unavailable("'clamscan' command not found")),
        FixedType(TypeDescription::unavailable("'file' command not found")),
    )
    .unwrap();

    let report = analyzer.analyze(file.path(), "c").await.unwrap();

    assert!(!report.malicious());
    assert!(report.yara_matches().is_unavailable());
    assert_eq!(
        report.file_type_info(),
        &TypeDescription::unavailable("'file' command not found")
    );
    assert!(!report.strings().is_empty());
}

#[tokio::test]
async fn stalled_collector_degrades_only_its_own_signal() {
    let image = pe::with_imports("KERNEL32.dll", &["VirtualAllocEx"]);
    let file = create_temp_file(&image);
    let analyzer = Analyzer::with_collectors(
        config_with_apis(&["VirtualAllocEx"]),
        FixedSignatures(SignatureMatchSet::Matched(vec!["Packed".to_string()])),
        StalledReputation(Duration::from_millis(50)),
        FixedType(TypeDescription::Described("PE32 executable".to_string())),
    )
    .unwrap();

    let started = Instant::now();
    let report = analyzer.analyze(file.path(), "slow.exe").await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(matches!(
        report.clamav_scan(),
        ReputationVerdict::Unavailable { .. }
    ));
    assert_eq!(report.yara_matches().rules(), ["Packed"]);
    assert_eq!(
        report.file_type_info(),
        &TypeDescription::Described("PE32 executable".to_string())
    );
    assert!(report.pe_analysis().is_recognized());
    assert!(report.malicious());
    assert_eq!(report.verdict_reasons().len(), 2);
}

#[tokio::test]
async fn missing_target_is_fatal() {
    let analyzer = quiet_analyzer(ScanConfig::default());
    let err = analyzer
        .analyze(Path::new("/nonexistent/binscan/target.exe"), "gone")
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::TargetUnreadable { .. }));
}

#[tokio::test]
async fn directory_target_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = quiet_analyzer(ScanConfig::default());
    let err = analyzer.analyze(dir.path(), "dir").await.unwrap_err();
    assert!(matches!(err, ScanError::TargetUnreadable { .. }));
}

#[test]
fn blocking_entry_point_matches_async() {
    let image = pe::with_imports("USER32.dll", &["MessageBoxA"]);
    let file = create_temp_file(&image);
    let analyzer = quiet_analyzer(ScanConfig::default());

    let report = analyzer.analyze_blocking(file.path(), "box.exe").unwrap();

    assert_eq!(report.pe_analysis().imports(), ["MessageBoxA"]);
    assert!(!report.malicious());
}

#[tokio::test]
async fn blocking_entry_point_refuses_to_nest_runtimes() {
    let file = create_temp_file(b"plain data");
    let analyzer = quiet_analyzer(ScanConfig::default());

    let err = analyzer.analyze_blocking(file.path(), "nested").unwrap_err();

    assert!(matches!(err, ScanError::Internal(_)));
    let report = analyzer.analyze(file.path(), "nested").await.unwrap();
    assert_eq!(report.file_name(), "nested");
}
