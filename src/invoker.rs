use std::fs::{File, OpenOptions, Permissions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

use crate::error::{InvokeError, Result};

/// Mode forced onto the log file so both the caller and the emulator can write it.
pub const LOG_FILE_MODE: u32 = 0o666;

/// Creates the log file if needed, makes it world read/write and opens it for
/// appending.
pub fn prepare_log_file(path: &Path) -> Result<File> {
    let log_err = |source| InvokeError::LogFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(log_err)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(log_err)?;
    std::fs::set_permissions(path, Permissions::from_mode(LOG_FILE_MODE)).map_err(log_err)?;
    debug!(path = %path.display(), "log file ready");
    Ok(file)
}

/// One run of the local emulator. Its stderr goes to `log`, its stdout is
/// captured.
pub struct Invocation {
    program: String,
    args: Vec<String>,
    log_path: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            log_path: log_path.into(),
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Feeds `input` on stdin, waits for exit and returns captured stdout.
    pub fn run(&self, mut log: File, input: &str) -> Result<Vec<u8>> {
        writeln!(
            log,
            "==> {} invoke {}",
            chrono::Local::now().to_rfc3339(),
            self.command_line()
        )?;

        info!(command = %self.command_line(), "spawning emulator");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::from(log))
            .spawn()
            .map_err(|source| InvokeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // stdin is fed from its own thread while stdout is drained
        let stdin = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(input.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (output, writer.join())
        });

        match written {
            Ok(Ok(())) => {}
            // the child may exit without reading its event
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                warn!("emulator closed stdin before reading the request");
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(std::io::Error::other("stdin writer panicked").into()),
        }
        let output = output?;
        debug!(status = %output.status, bytes = output.stdout.len(), "emulator finished");
        if !output.status.success() {
            return Err(InvokeError::ChildFailed {
                program: self.program.clone(),
                status: output.status,
                log: self.log_path.clone(),
            });
        }
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str, log: &Path) -> Invocation {
        Invocation::new("sh", vec!["-c".into(), script.into()], log)
    }

    #[test]
    fn log_file_is_created_world_writable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("api-gateway.log");
        prepare_log_file(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, LOG_FILE_MODE);
    }

    #[test]
    fn stdin_reaches_child_and_stdout_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.log");
        let log = prepare_log_file(&log_path).unwrap();
        let out = sh("cat", &log_path).run(log, "{\"a\":1}\n").unwrap();
        assert_eq!(out, b"{\"a\":1}\n");
    }

    #[test]
    fn large_request_does_not_stall_an_echoing_child() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.log");
        let log = prepare_log_file(&log_path).unwrap();
        let request = format!("{{\"body\":\"{}\"}}\n", "x".repeat(512 * 1024));

        let (tx, rx) = std::sync::mpsc::channel();
        let inv = Invocation::new("cat", vec![], &log_path);
        let input = request.clone();
        std::thread::spawn(move || {
            let _ = tx.send(inv.run(log, &input));
        });

        let out = rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("emulator run blocked")
            .unwrap();
        assert_eq!(out.len(), request.len());
        assert_eq!(out, request.as_bytes());
    }

    #[test]
    fn stderr_is_appended_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.log");
        std::fs::write(&log_path, "earlier run\n").unwrap();
        let log = prepare_log_file(&log_path).unwrap();
        sh("cat >/dev/null; echo 'Invoking Handler' >&2; echo '{}'", &log_path)
            .run(log, "{}\n")
            .unwrap();

        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert!(contents.starts_with("earlier run\n"));
        assert!(contents.contains("==> "));
        assert!(contents.ends_with("Invoking Handler\n"));
    }

    #[test]
    fn non_zero_exit_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.log");
        let log = prepare_log_file(&log_path).unwrap();
        let err = sh("exit 3", &log_path).run(log, "{}\n").unwrap_err();
        assert!(matches!(err, InvokeError::ChildFailed { .. }));
        assert!(err.to_string().contains("run.log"));
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.log");
        let log = prepare_log_file(&log_path).unwrap();
        let err = Invocation::new("definitely-not-installed-emulator", vec![], &log_path)
            .run(log, "{}\n")
            .unwrap_err();
        assert!(matches!(err, InvokeError::Spawn { .. }));
    }

    #[test]
    fn command_line_joins_program_and_args() {
        let inv = Invocation::new(
            "aws-sam-local",
            vec!["local".into(), "invoke".into(), "Fn".into()],
            "/tmp/x.log",
        );
        assert_eq!(inv.command_line(), "aws-sam-local local invoke Fn");
    }
}
