use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use binscan::collectors::{
    ClamAvCollector, Collector, FileTypeCollector, ToolError, ToolOutput, ToolRunner,
    YaraCollector,
};
use binscan::config::ToolPaths;
use binscan::triage::{
    Analyzer, ReputationVerdict, SignatureMatchSet, TypeDescription, VerdictReason,
};
use binscan::ScanConfig;

use crate::common::{create_temp_file, pe};

/// Runner that records its invocations and replays one canned answer.
struct CannedRunner {
    answer: Result<ToolOutput, String>,
    calls: Mutex<Vec<(PathBuf, Vec<OsString>)>>,
}

impl CannedRunner {
    fn output(status: i32, stdout: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(ToolOutput {
                status: Some(status),
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn not_found(program: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(program.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn last_args(&self) -> Vec<OsString> {
        self.calls.lock().unwrap().last().unwrap().1.clone()
    }
}

impl ToolRunner for CannedRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[OsString],
        _timeout: Duration,
    ) -> Result<ToolOutput, ToolError> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_path_buf(), args.to_vec()));
        match &self.answer {
            Ok(output) => Ok(output.clone()),
            Err(program) => Err(ToolError::NotFound {
                program: program.clone(),
            }),
        }
    }
}

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn clamscan_detection_is_infected() {
    let runner = CannedRunner::output(1, "/tmp/x.exe: Win.Test.EICAR_HDB-1 FOUND\n");
    let collector = ClamAvCollector::new(Arc::clone(&runner), "clamscan", TIMEOUT);

    let verdict = collector.collect(Path::new("/tmp/x.exe")).await;

    assert_eq!(verdict, ReputationVerdict::Infected);
    assert_eq!(
        runner.last_args(),
        vec![OsString::from("--no-summary"), OsString::from("/tmp/x.exe")]
    );
}

#[tokio::test]
async fn clamscan_ok_is_clean() {
    let runner = CannedRunner::output(0, "/tmp/x.exe: OK\n");
    let collector = ClamAvCollector::new(runner, "clamscan", TIMEOUT);
    assert_eq!(
        collector.collect(Path::new("/tmp/x.exe")).await,
        ReputationVerdict::Clean
    );
}

#[tokio::test]
async fn missing_tools_become_unavailable() {
    let clam = ClamAvCollector::new(CannedRunner::not_found("clamscan"), "clamscan", TIMEOUT);
    assert_eq!(
        clam.collect(Path::new("/tmp/x")).await,
        ReputationVerdict::unavailable("'clamscan' command not found")
    );

    let file = FileTypeCollector::new(CannedRunner::not_found("file"), "file", TIMEOUT);
    assert_eq!(
        file.collect(Path::new("/tmp/x")).await,
        TypeDescription::unavailable("'file' command not found")
    );
}

#[tokio::test]
async fn file_description_is_trimmed_and_path_free() {
    let runner = CannedRunner::output(0, "PE32 executable (GUI) Intel 80386, for MS Windows\n");
    let collector = FileTypeCollector::new(Arc::clone(&runner), "file", TIMEOUT);

    let description = collector.collect(Path::new("/tmp/upload-1234")).await;

    assert_eq!(
        description,
        TypeDescription::Described("PE32 executable (GUI) Intel 80386, for MS Windows".to_string())
    );
    assert_eq!(runner.last_args()[0], OsString::from("--brief"));
}

#[tokio::test]
async fn yara_without_rules_file_is_unavailable() {
    let runner = CannedRunner::output(0, "Never_Reported /tmp/x\n");
    let collector = YaraCollector::new(
        Arc::clone(&runner),
        "yara",
        "/nonexistent/rules.yar",
        TIMEOUT,
    );

    let matches = collector.collect(Path::new("/tmp/x")).await;

    assert!(matches.is_unavailable());
    assert!(runner.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn yara_rules_path_naming_a_directory_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let runner = CannedRunner::output(0, "Never_Reported /tmp/x\n");
    let collector = YaraCollector::new(Arc::clone(&runner), "yara", dir.path(), TIMEOUT);

    let matches = collector.collect(Path::new("/tmp/x")).await;

    assert!(matches.is_unavailable());
    assert!(runner.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn yara_failure_is_not_a_match() {
    let rules = create_temp_file(b"rule Dummy { condition: true }");
    let runner = Arc::new(CannedRunner {
        answer: Ok(ToolOutput {
            status: Some(1),
            stdout: String::new(),
            stderr: "error: rules.yar(1): syntax error\n".to_string(),
        }),
        calls: Mutex::new(Vec::new()),
    });
    let collector = YaraCollector::new(runner, "yara", rules.path(), TIMEOUT);

    let matches = collector.collect(Path::new("/tmp/x")).await;

    assert_eq!(matches.rules(), &[] as &[String]);
    assert!(matches.is_unavailable());
}

#[tokio::test]
async fn yara_matches_are_deduplicated_in_order() {
    let rules = create_temp_file(b"rule Dummy { condition: true }");
    let runner = CannedRunner::output(0, "B_Rule /tmp/x\nA_Rule /tmp/x\nB_Rule /tmp/x\n");
    let collector = YaraCollector::new(Arc::clone(&runner), "yara", rules.path(), TIMEOUT);

    let matches = collector.collect(Path::new("/tmp/x")).await;

    assert_eq!(
        matches,
        SignatureMatchSet::Matched(vec!["B_Rule".to_string(), "A_Rule".to_string()])
    );
    assert_eq!(
        runner.last_args(),
        vec![rules.path().as_os_str().to_owned(), OsString::from("/tmp/x")]
    );
}

/// Real processes: the signature matcher is played by `sh` running a script
/// passed in the rules position, and the other two tools are absent.
#[cfg(unix)]
#[tokio::test]
async fn process_backed_analyzer_survives_missing_tools() {
    let script = create_temp_file(b"echo \"Dropper_Rule $1\"\necho \"Dropper_Rule $1\"\n");
    let image = pe::with_imports("KERNEL32.dll", &["CreateFileA"]);
    let target = create_temp_file(&image);

    let config = ScanConfig {
        yara_rules_path: script.path().to_path_buf(),
        external_tool_timeout: Duration::from_secs(10),
        tools: ToolPaths {
            yara: PathBuf::from("sh"),
            clamscan: PathBuf::from("binscan-test-missing-clamscan"),
            file: PathBuf::from("binscan-test-missing-file"),
        },
        ..ScanConfig::default()
    };
    let analyzer = Analyzer::new(config).unwrap();

    let report = analyzer.analyze(target.path(), "sample.exe").await.unwrap();

    assert_eq!(report.yara_matches().rules(), ["Dropper_Rule"]);
    assert_eq!(
        report.clamav_scan(),
        &ReputationVerdict::unavailable("'binscan-test-missing-clamscan' command not found")
    );
    assert!(matches!(
        report.file_type_info(),
        TypeDescription::Unavailable { .. }
    ));
    assert!(report.pe_analysis().is_recognized());
    assert!(report.malicious());
    assert_eq!(
        report.verdict_reasons(),
        [VerdictReason::SignatureMatch {
            rules: vec!["Dropper_Rule".to_string()]
        }]
    );
}
