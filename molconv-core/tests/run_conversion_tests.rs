//! Integration tests for the conversion runner, driving it against stub
//! executables written into a temporary directory. Each stub impersonates
//! one behavior of the real tool: clean output, an explicit rejection on
//! stderr, silence, a hang, or garbage bytes on stdout.

use molconv_core::{
    check_dependency, run_conversion, ConversionConfig, ConversionRequest, CoreError, Payload,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

const PROPANE_INCHI: &str = "InChI=1S/C3H8/c1-3-2/h3H2,1-2H3";

/// Writes an executable shell script into `dir` and returns its path.
fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Builds a config pointing at `stub`, with failure records kept inside
/// the same temporary directory.
fn config_for(stub: &Path, dir: &Path) -> ConversionConfig {
    let mut config = ConversionConfig::new(stub);
    config.log_dir = dir.join("logs");
    config
}

fn smiles_to_inchi() -> ConversionRequest {
    ConversionRequest::new("smiles", "inchi")
}

fn record_count(log_dir: &Path) -> usize {
    match fs::read_dir(log_dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

#[test]
fn test_successful_conversion_is_trimmed() {
    let dir = tempdir().unwrap();
    let stub = write_stub(
        dir.path(),
        "babel",
        &format!("cat > /dev/null\nprintf '  {PROPANE_INCHI}  \\n'"),
    );
    let config = config_for(&stub, dir.path());

    let result = run_conversion(&config, &smiles_to_inchi(), &Payload::from("CCC")).unwrap();
    assert_eq!(result, PROPANE_INCHI);

    // Nothing failed, so nothing was dumped.
    assert_eq!(record_count(&config.log_dir), 0);
}

#[test]
fn test_stdin_payload_reaches_the_tool() {
    let dir = tempdir().unwrap();
    // The stub echoes its stdin back, proving the temp-file plumbing works.
    let stub = write_stub(dir.path(), "babel", "cat");
    let config = config_for(&stub, dir.path());

    let result = run_conversion(&config, &smiles_to_inchi(), &Payload::from("CCC")).unwrap();
    assert_eq!(result, "CCC");
}

#[test]
fn test_rejected_input_fails_with_tool_failure_and_dumps() {
    let dir = tempdir().unwrap();
    let stub = write_stub(
        dir.path(),
        "babel",
        "echo 'ERROR: not a valid smiles' >&2\nexit 1",
    );
    let config = config_for(&stub, dir.path());

    let err = run_conversion(&config, &smiles_to_inchi(), &Payload::from("ACC")).unwrap_err();
    match err {
        CoreError::ToolFailure(stderr) => assert!(stderr.contains("ERROR: not a valid smiles")),
        e => panic!("Unexpected error type: {e:?}"),
    }

    // One .log / .sh record pair.
    assert_eq!(record_count(&config.log_dir), 2);
}

#[test]
fn test_empty_output_without_error_marker_is_still_a_failure() {
    let dir = tempdir().unwrap();
    let stub = write_stub(dir.path(), "babel", "exit 0");
    let config = config_for(&stub, dir.path());

    let err = run_conversion(&config, &smiles_to_inchi(), &Payload::from("CCC")).unwrap_err();
    match err {
        CoreError::ToolFailure(_) => {}
        e => panic!("Unexpected error type: {e:?}"),
    }
    assert_eq!(record_count(&config.log_dir), 2);
}

#[test]
fn test_whitespace_only_output_is_a_failure() {
    let dir = tempdir().unwrap();
    let stub = write_stub(dir.path(), "babel", "printf '  \\n\\n'");
    let config = config_for(&stub, dir.path());

    let err = run_conversion(&config, &smiles_to_inchi(), &Payload::from("CCC")).unwrap_err();
    assert!(matches!(err, CoreError::ToolFailure(_)));
}

#[test]
fn test_timeout_kills_the_child_and_dumps() {
    let dir = tempdir().unwrap();
    let stub = write_stub(dir.path(), "babel", "sleep 10");
    let mut config = config_for(&stub, dir.path());
    config.timeout = Duration::from_millis(200);

    let err = run_conversion(&config, &smiles_to_inchi(), &Payload::from("CCC")).unwrap_err();
    match err {
        CoreError::Timeout { timeout, command } => {
            assert_eq!(timeout, Duration::from_millis(200));
            assert!(command.contains("-ismiles"));
            assert!(command.contains("-oinchi"));
        }
        e => panic!("Unexpected error type: {e:?}"),
    }
    assert_eq!(record_count(&config.log_dir), 2);
}

#[test]
fn test_lingering_pipe_holder_does_not_extend_the_deadline() {
    let dir = tempdir().unwrap();
    // The tool exits immediately, but a backgrounded grandchild inherits
    // its stdout/stderr pipes and keeps them open well past the timeout.
    let stub = write_stub(dir.path(), "babel", "sleep 5 &\nexit 0");
    let mut config = config_for(&stub, dir.path());
    config.timeout = Duration::from_millis(200);

    let start = std::time::Instant::now();
    let err = run_conversion(&config, &smiles_to_inchi(), &Payload::from("CCC")).unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, CoreError::Timeout { .. }));
    assert!(
        elapsed < Duration::from_secs(2),
        "call was not bounded by the 200ms timeout: took {elapsed:?}"
    );
    assert_eq!(record_count(&config.log_dir), 2);
}

#[test]
fn test_timeout_does_not_leak_into_the_next_call() {
    let dir = tempdir().unwrap();
    let slow = write_stub(dir.path(), "babel-slow", "sleep 10");
    let fast = write_stub(
        dir.path(),
        "babel-fast",
        &format!("cat > /dev/null\necho '{PROPANE_INCHI}'"),
    );

    let mut slow_config = config_for(&slow, dir.path());
    slow_config.timeout = Duration::from_millis(200);
    let err = run_conversion(&slow_config, &smiles_to_inchi(), &Payload::from("CCC")).unwrap_err();
    assert!(matches!(err, CoreError::Timeout { .. }));

    // The deadline is per call; an unrelated follow-up call with a normal
    // timeout is unaffected.
    let fast_config = config_for(&fast, dir.path());
    let result = run_conversion(&fast_config, &smiles_to_inchi(), &Payload::from("CCC")).unwrap();
    assert_eq!(result, PROPANE_INCHI);
}

#[test]
fn test_undecodable_output_dumps_input_and_output_records() {
    let dir = tempdir().unwrap();
    let stub = write_stub(dir.path(), "babel", "cat > /dev/null\nprintf '\\377\\376\\375'");
    let config = config_for(&stub, dir.path());

    let err = run_conversion(&config, &smiles_to_inchi(), &Payload::from("CCC")).unwrap_err();
    assert!(matches!(err, CoreError::OutputNotUtf8(_)));

    // Two record pairs: the original input and the raw stdout bytes.
    assert_eq!(record_count(&config.log_dir), 4);

    // The dumped stdout record holds the garbage bytes verbatim.
    let has_raw_output = fs::read_dir(&config.log_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "log"))
        .any(|e| fs::read(e.path()).unwrap() == vec![0xff, 0xfe, 0xfd]);
    assert!(has_raw_output);
}

#[test]
fn test_repeated_identical_failures_share_one_record_pair() {
    let dir = tempdir().unwrap();
    let stub = write_stub(
        dir.path(),
        "babel",
        "echo 'ERROR: not a valid smiles' >&2",
    );
    let config = config_for(&stub, dir.path());

    for _ in 0..3 {
        let err = run_conversion(&config, &smiles_to_inchi(), &Payload::from("ACC")).unwrap_err();
        assert!(matches!(err, CoreError::ToolFailure(_)));
    }
    assert_eq!(record_count(&config.log_dir), 2);
}

#[test]
fn test_environment_overrides_reach_the_child() {
    let dir = tempdir().unwrap();
    let stub = write_stub(
        dir.path(),
        "babel",
        "cat > /dev/null\necho \"H=${DONT_FIX_H_INCHI:-unset} LIB=${BABEL_LIBDIR:-unset}\"",
    );

    let mut config = config_for(&stub, dir.path());
    config.babel_libdir = Some(PathBuf::from("/opt/babel/data"));
    let mut request = smiles_to_inchi();
    request.dont_add_h = true;

    let result = run_conversion(&config, &request, &Payload::from("CCC")).unwrap();
    assert_eq!(result, "H=1 LIB=/opt/babel/data");

    // Both overrides are per call, not process-global.
    let plain_config = config_for(&stub, dir.path());
    let result = run_conversion(&plain_config, &smiles_to_inchi(), &Payload::from("CCC")).unwrap();
    assert_eq!(result, "H=unset LIB=unset");
}

#[test]
fn test_arguments_are_passed_in_order() {
    let dir = tempdir().unwrap();
    let stub = write_stub(dir.path(), "babel", "cat > /dev/null\necho \"$@\"");

    let config = config_for(&stub, dir.path());
    let mut request = ConversionRequest::new("pdb", "inchi");
    request.title = Some("W60R".to_string());
    request.ph = Some(7.0);
    request.extra_args = "-c --gen3d".to_string();

    let result = run_conversion(&config, &request, &Payload::from("CCC")).unwrap();
    assert_eq!(result, "-ipdb -oinchi --title W60R -p 7 -c --gen3d");
}

#[test]
fn test_binary_payload_is_accepted() {
    let dir = tempdir().unwrap();
    let stub = write_stub(dir.path(), "babel", "wc -c");
    let config = config_for(&stub, dir.path());

    let payload = Payload::Bytes(vec![0x00, 0xff, 0x42]);
    let result = run_conversion(&config, &smiles_to_inchi(), &payload).unwrap();
    assert_eq!(result, "3");
}

#[test]
#[should_panic(expected = "does not exist")]
fn test_missing_executable_panics_before_launch() {
    let dir = tempdir().unwrap();
    let config = config_for(&dir.path().join("no-such-babel"), dir.path());
    let _ = run_conversion(&config, &smiles_to_inchi(), &Payload::from("CCC"));
}

#[test]
fn test_check_dependency_reports_missing_tool() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("no-such-babel");

    match check_dependency(&missing) {
        Err(CoreError::DependencyNotFound(path)) => assert_eq!(path, missing),
        other => panic!("Unexpected result: {other:?}"),
    }
}

#[test]
fn test_check_dependency_accepts_a_runnable_tool() {
    let dir = tempdir().unwrap();
    let stub = write_stub(dir.path(), "babel", "exit 0");
    assert!(check_dependency(&stub).is_ok());
}
