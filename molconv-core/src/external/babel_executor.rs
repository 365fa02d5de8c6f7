// ============================================================================
// molconv-core/src/external/babel_executor.rs
// ============================================================================
//
// BABEL EXECUTOR: Single-Invocation Runner for the Conversion Tool
//
// This module builds the command line for one conversion, launches the tool
// as a child process with the payload staged through a temporary file on
// stdin, enforces a per-call wall-clock deadline, and classifies the outcome
// as success, timeout, tool failure, or output-decoding failure. Every
// abnormal path leaves a failure record on disk before the error propagates.
//
// ARCHITECTURE:
// The deadline is a per-call polling loop over try_wait, not a shared timer,
// so concurrent conversions from independent threads do not interfere.
// Stdout and stderr are drained by dedicated reader threads to avoid pipe
// deadlock while the parent waits.

use std::io::{Read, Seek, SeekFrom, Write};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{ConversionConfig, ConversionRequest};
use crate::error::{CoreError, CoreResult};
use crate::failure_log::dump_failure;
use crate::payload::Payload;

/// Stderr marker the tool emits when it rejects the input outright.
const INVALID_INPUT_MARKER: &[u8] = b"ERROR: not a valid";

/// Poll interval for the child-process deadline loop.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Builds the full argument vector for one conversion, executable first.
///
/// Layout matches what the tool expects: `-i<fmt>` / `-o<fmt>` fused flags,
/// `--title` and `-p` only when set, then any extra arguments split on
/// whitespace and appended verbatim.
pub fn build_args(config: &ConversionConfig, request: &ConversionRequest) -> Vec<String> {
    let mut args = vec![
        config.executable.display().to_string(),
        format!("-i{}", request.in_format),
        format!("-o{}", request.out_format),
    ];

    if let Some(title) = &request.title {
        args.push("--title".to_string());
        args.push(title.clone());
    }

    if let Some(ph) = request.ph {
        args.push("-p".to_string());
        args.push(ph.to_string());
    }

    args.extend(request.extra_args.split_whitespace().map(String::from));

    args
}

/// Joins an argument vector into the command-line string recorded in
/// failure records and error messages.
pub fn command_line(args: &[String]) -> String {
    args.join(" ")
}

/// Builds the per-call environment overrides layered over the inherited
/// process environment: hydrogen-insertion suppression and the tool's
/// library-directory override, each only when requested.
pub fn build_env(config: &ConversionConfig, request: &ConversionRequest) -> Vec<(String, String)> {
    let mut env = Vec::new();
    if request.dont_add_h {
        env.push(("DONT_FIX_H_INCHI".to_string(), "1".to_string()));
    }
    if let Some(libdir) = &config.babel_libdir {
        env.push(("BABEL_LIBDIR".to_string(), libdir.display().to_string()));
    }
    env
}

/// Runs one conversion through the external tool.
///
/// The payload is normalized to bytes and delivered on the child's stdin
/// via a temporary file; stdout and stderr are captured separately. The
/// call is bounded by `config.timeout`, after which the child is killed
/// (best effort) and a timeout error is returned.
///
/// Returns the tool's stdout, decoded as UTF-8 and trimmed of surrounding
/// whitespace. Empty output is a failure even when the tool reported no
/// explicit error.
///
/// # Panics
///
/// Panics if `config.executable` does not exist. A missing executable is a
/// deployment mistake, not a runtime condition this crate classifies.
pub fn run_conversion(
    config: &ConversionConfig,
    request: &ConversionRequest,
    payload: &Payload,
) -> CoreResult<String> {
    assert!(
        config.executable.exists(),
        "conversion executable {:?} does not exist",
        config.executable
    );

    let args = build_args(config, request);
    let command = command_line(&args);

    if config.debug {
        log::info!("Running conversion: {command}");
    } else {
        log::debug!("Running conversion: {command}");
    }

    // Stage the payload in an unnamed temp file so the child reads a real
    // file descriptor on stdin. The handle is consumed by the spawn and
    // reclaimed by the OS on every exit path.
    let mut stdin_file = tempfile::tempfile()?;
    stdin_file.write_all(payload.as_bytes())?;
    stdin_file.seek(SeekFrom::Start(0))?;

    let mut cmd = Command::new(&config.executable);
    cmd.args(&args[1..])
        .stdin(Stdio::from(stdin_file))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    cmd.envs(build_env(config, request));

    let mut child = cmd
        .spawn()
        .map_err(|e| CoreError::CommandStart(command.clone(), e))?;

    // Drain both pipes on their own threads, keeping the raw bytes: decode
    // problems in the tool's output must stay observable.
    let mut stdout_pipe = child.stdout.take().unwrap();
    let stdout_handle = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stdout_pipe.read_to_end(&mut buf);
        buf
    });

    let mut stderr_pipe = child.stderr.take().unwrap();
    let stderr_handle = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stderr_pipe.read_to_end(&mut buf);
        buf
    });

    // One deadline bounds the whole call: the wait for the child's exit
    // and the draining of its output.
    let deadline = Instant::now() + config.timeout;

    let status = match wait_with_deadline(&mut child, deadline)? {
        Some(status) => status,
        None => {
            // Deadline passed. Kill is best effort; reaping the killed
            // child keeps it from lingering as a zombie.
            let _ = child.kill();
            let _ = child.wait();
            log::error!("Conversion timed out after {:?}: {command}", config.timeout);
            dump_failure(&config.log_dir, payload, &command)?;
            return Err(CoreError::Timeout {
                timeout: config.timeout,
                command,
            });
        }
    };

    // The child has exited, but its pipes stay open as long as any
    // inherited copy of them lives; the tool can fork helpers that
    // outlive it. The drain is bounded by the same deadline.
    let (stdout, stderr) = match drain_with_deadline(stdout_handle, stderr_handle, deadline) {
        Some(output) => output,
        None => {
            log::error!(
                "Conversion tool exited but its output pipes stayed open past {:?}: {command}",
                config.timeout
            );
            dump_failure(&config.log_dir, payload, &command)?;
            return Err(CoreError::Timeout {
                timeout: config.timeout,
                command,
            });
        }
    };
    log::debug!("Conversion tool exited with status {status}");

    if contains_subslice(&stderr, INVALID_INPUT_MARKER) {
        let stderr_text = String::from_utf8_lossy(&stderr).into_owned();
        log::error!("Conversion tool rejected input: {}", stderr_text.trim());
        dump_failure(&config.log_dir, payload, &command)?;
        return Err(CoreError::ToolFailure(stderr_text));
    }

    let decoded = match String::from_utf8(stdout) {
        Ok(text) => text,
        Err(e) => {
            // Dump the original input and the undecodable output as
            // separate records, then propagate the decode error itself.
            dump_failure(&config.log_dir, payload, &command)?;
            dump_failure(&config.log_dir, &Payload::Bytes(e.as_bytes().to_vec()), &command)?;
            return Err(e.into());
        }
    };

    let result = decoded.trim();
    if result.is_empty() {
        let stderr_text = String::from_utf8_lossy(&stderr).into_owned();
        log::error!("Conversion tool produced no output (command: {command})");
        dump_failure(&config.log_dir, payload, &command)?;
        return Err(CoreError::ToolFailure(stderr_text));
    }

    Ok(result.to_string())
}

/// Waits for the child until the wall-clock deadline, polling `try_wait`.
/// Returns `Ok(None)` when the deadline expires before the child exits.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Instant,
) -> CoreResult<Option<std::process::ExitStatus>> {
    loop {
        match child.try_wait()? {
            Some(status) => return Ok(Some(status)),
            None => {
                if Instant::now() >= deadline {
                    return Ok(None);
                }
                thread::sleep(WAIT_POLL_INTERVAL);
            }
        }
    }
}

/// Waits for both reader threads until the deadline. Returns `None` when a
/// pipe is still open at the deadline; the abandoned threads finish on
/// their own once the last pipe holder exits.
fn drain_with_deadline(
    stdout_handle: thread::JoinHandle<Vec<u8>>,
    stderr_handle: thread::JoinHandle<Vec<u8>>,
    deadline: Instant,
) -> Option<(Vec<u8>, Vec<u8>)> {
    while !(stdout_handle.is_finished() && stderr_handle.is_finished()) {
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(WAIT_POLL_INTERVAL);
    }
    Some((join_reader(stdout_handle), join_reader(stderr_handle)))
}

fn join_reader(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
    match handle.join() {
        Ok(buf) => buf,
        Err(_) => {
            log::warn!("Output reader thread panicked; treating its stream as empty");
            Vec::new()
        }
    }
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
