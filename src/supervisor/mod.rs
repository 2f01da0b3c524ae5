//! Supervised emulator runs
//!
//! Launches the emulator binary and watches its stdout until it reveals
//! which title it ran and how many shaders it loaded from the cache.
//!
//! ```text
//! Running ──title + count seen──▶ Resolved(RunReport)   (child is killed)
//!    │
//!    └──child exits first───────▶ Exited
//! ```
//!
//! Output the child wrote before exiting is still read, so a report that
//! completes in the final lines resolves. A pipe held open by a descendant
//! does not keep the run alive past the child's exit.
//!
//! There is no timeout: a caller that needs one wraps [`ProcessSupervisor::run`]
//! in `tokio::time::timeout`, which drops and kills the child.

mod matcher;

pub use matcher::{OutputMatcher, ProcessObservation, RunReport};

use crate::error::{ShaderkitError, ShaderkitResult};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info};

const READ_CHUNK: usize = 8 * 1024;

/// How long to keep collecting stdout once the child has exited
const EXIT_DRAIN_GRACE: Duration = Duration::from_millis(50);

/// Final state of a supervised run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisionOutcome {
    Resolved(RunReport),
    /// The process ended before revealing title and shader count
    Exited,
}

/// Whichever happened first: a verdict from stdout or the child exiting
enum Race {
    Output(ShaderkitResult<Option<RunReport>>),
    ChildExit(io::Result<ExitStatus>),
}

/// Runs one emulator binary under observation
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    binary: PathBuf,
}

impl ProcessSupervisor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Launch the binary with no arguments and watch it
    pub async fn run(&self) -> ShaderkitResult<SupervisionOutcome> {
        info!("Launching {}", self.binary.display());

        let mut child = Command::new(&self.binary)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ShaderkitError::SupervisorSpawn {
                binary: self.binary.clone(),
                source: e,
            })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ShaderkitError::Internal("emulator stdout not piped".to_string()))?;

        let mut matcher = OutputMatcher::new();
        let race = tokio::select! {
            observed = read_until_report(&mut stdout, &mut matcher) => Race::Output(observed),
            status = child.wait() => Race::ChildExit(status),
        };

        match race {
            Race::Output(Ok(Some(report))) => {
                debug!("Observed {:?}, stopping emulator", report);
                // The child may already be gone; reaping below covers both cases.
                let _ = child.start_kill();
                let _ = child.wait().await;
                Ok(SupervisionOutcome::Resolved(report))
            }
            Race::Output(Ok(None)) => {
                let status = child.wait().await;
                debug!("Emulator exited without a shader report: {:?}", status);
                Ok(SupervisionOutcome::Exited)
            }
            Race::Output(Err(e)) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                Err(e)
            }
            Race::ChildExit(status) => {
                debug!("Emulator exited with {:?}", status);
                match drain_after_exit(&mut stdout, &mut matcher).await {
                    Some(report) => {
                        debug!("Observed {:?} in final output", report);
                        Ok(SupervisionOutcome::Resolved(report))
                    }
                    None => Ok(SupervisionOutcome::Exited),
                }
            }
        }
    }
}

/// Read `output` until a run report can be formed.
///
/// Returns `Ok(None)` if the stream ends first.
pub async fn observe_output<R>(mut output: R) -> ShaderkitResult<Option<RunReport>>
where
    R: AsyncRead + Unpin,
{
    let mut matcher = OutputMatcher::new();
    read_until_report(&mut output, &mut matcher).await
}

async fn read_until_report<R>(
    output: &mut R,
    matcher: &mut OutputMatcher,
) -> ShaderkitResult<Option<RunReport>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let n = output
            .read(&mut buf)
            .await
            .map_err(ShaderkitError::SupervisorStream)?;
        if n == 0 {
            return Ok(None);
        }
        if let Some(report) = matcher.feed(&buf[..n]) {
            return Ok(Some(report));
        }
    }
}

/// Feed whatever the exited child left in the pipe.
///
/// Stops at end of stream, a read error, or once the pipe stays quiet for
/// [`EXIT_DRAIN_GRACE`].
async fn drain_after_exit<R>(output: &mut R, matcher: &mut OutputMatcher) -> Option<RunReport>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        match tokio::time::timeout(EXIT_DRAIN_GRACE, output.read(&mut buf)).await {
            Ok(Ok(0)) | Err(_) => return None,
            Ok(Ok(n)) => {
                if let Some(report) = matcher.feed(&buf[..n]) {
                    return Some(report);
                }
            }
            Ok(Err(e)) => {
                debug!("Emulator stdout failed after exit: {}", e);
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Hands out one scripted chunk per read, then optionally fails
    struct ScriptedOutput {
        chunks: Vec<&'static [u8]>,
        fail_at_end: bool,
    }

    impl AsyncRead for ScriptedOutput {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.chunks.is_empty() {
                if self.fail_at_end {
                    return Poll::Ready(Err(io::Error::other("pipe broken")));
                }
                return Poll::Ready(Ok(()));
            }
            let chunk = self.chunks.remove(0);
            buf.put_slice(chunk);
            Poll::Ready(Ok(()))
        }
    }

    fn scripted(chunks: Vec<&'static [u8]>) -> ScriptedOutput {
        ScriptedOutput {
            chunks,
            fail_at_end: false,
        }
    }

    #[tokio::test]
    async fn split_delivery_resolves() {
        let output = scripted(vec![
            b"[Info] Game: for Title 0100",
            b"ABCD\n[Info] Shader cache loaded ",
            b"42 entries\n",
            b"this is never read",
        ]);
        let report = observe_output(output).await.unwrap().unwrap();
        assert_eq!(report.ran_title_id, "0100ABCD");
        assert_eq!(report.compiled_shaders, 42);
    }

    #[tokio::test]
    async fn single_delivery_resolves() {
        let output = scripted(vec![b"for Title 0100ABCD\nShader cache loaded 42 entries\n"]);
        let report = observe_output(output).await.unwrap().unwrap();
        assert_eq!(report.ran_title_id, "0100ABCD");
        assert_eq!(report.compiled_shaders, 42);
    }

    #[tokio::test]
    async fn end_of_stream_without_count_is_none() {
        let output = scripted(vec![b"for Title 0100ABCD\n", b"Goodbye\n"]);
        assert_eq!(observe_output(output).await.unwrap(), None);
    }

    #[tokio::test]
    async fn read_error_fails() {
        let output = ScriptedOutput {
            chunks: vec![b"for Title 0100ABCD\n"],
            fail_at_end: true,
        };
        let err = observe_output(output).await.unwrap_err();
        assert!(matches!(err, ShaderkitError::SupervisorStream(_)));
    }

    #[tokio::test]
    async fn missing_binary_fails_to_spawn() {
        let supervisor = ProcessSupervisor::new("/nonexistent/path/to/ryujinx");
        let err = supervisor.run().await.unwrap_err();
        assert!(matches!(err, ShaderkitError::SupervisorSpawn { .. }));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::time::{Duration, Instant};
        use tempfile::TempDir;

        fn script(dir: &TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("ryujinx-test.sh");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn resolves_and_kills_long_running_emulator() {
            let dir = TempDir::new().unwrap();
            let bin = script(
                &dir,
                "echo 'for Title 0100ABCD'\necho 'Shader cache loaded 42 entries'\nexec sleep 30",
            );

            let started = Instant::now();
            let outcome = ProcessSupervisor::new(bin).run().await.unwrap();

            assert!(started.elapsed() < Duration::from_secs(10));
            assert_eq!(
                outcome,
                SupervisionOutcome::Resolved(RunReport {
                    ran_title_id: "0100ABCD".to_string(),
                    compiled_shaders: 42,
                    emulator_version: None,
                })
            );
        }

        #[tokio::test]
        async fn zero_shaders_resolve_without_waiting() {
            let dir = TempDir::new().unwrap();
            let bin = script(
                &dir,
                "echo 'for Title 0100ABCD'\necho 'Shader cache loaded 0 entries'\nexec sleep 30",
            );

            let started = Instant::now();
            let outcome = ProcessSupervisor::new(bin).run().await.unwrap();

            assert!(started.elapsed() < Duration::from_secs(10));
            match outcome {
                SupervisionOutcome::Resolved(report) => assert_eq!(report.compiled_shaders, 0),
                other => panic!("unexpected outcome: {other:?}"),
            }
        }

        #[tokio::test]
        async fn writes_split_across_time_resolve() {
            let dir = TempDir::new().unwrap();
            let bin = script(
                &dir,
                "printf 'for Title 0100AB'\nsleep 0.2\nprintf 'CD\\nShader cache loaded 4'\nsleep 0.2\nprintf '2 entries\\n'\nexec sleep 30",
            );

            match ProcessSupervisor::new(bin).run().await.unwrap() {
                SupervisionOutcome::Resolved(report) => {
                    assert_eq!(report.ran_title_id, "0100ABCD");
                    assert_eq!(report.compiled_shaders, 42);
                }
                other => panic!("unexpected outcome: {other:?}"),
            }
        }

        #[tokio::test]
        async fn early_exit_is_reported() {
            let dir = TempDir::new().unwrap();
            let bin = script(&dir, "echo 'for Title 0100ABCD'\nexit 0");

            let outcome = ProcessSupervisor::new(bin).run().await.unwrap();
            assert_eq!(outcome, SupervisionOutcome::Exited);
        }

        #[tokio::test]
        async fn exit_is_reported_while_descendant_holds_stdout() {
            let dir = TempDir::new().unwrap();
            let bin = script(&dir, "echo 'for Title 0100ABCD'\nsleep 5 &\nexit 0");

            let outcome = tokio::time::timeout(
                Duration::from_secs(3),
                ProcessSupervisor::new(bin).run(),
            )
            .await
            .expect("run outlived the emulator")
            .unwrap();
            assert_eq!(outcome, SupervisionOutcome::Exited);
        }

        #[tokio::test]
        async fn report_in_final_output_resolves_after_exit() {
            let dir = TempDir::new().unwrap();
            let bin = script(
                &dir,
                "echo 'for Title 0100ABCD'\necho 'Shader cache loaded 7 entries'\nsleep 5 &\nexit 0",
            );

            let outcome = tokio::time::timeout(
                Duration::from_secs(3),
                ProcessSupervisor::new(bin).run(),
            )
            .await
            .expect("run outlived the emulator")
            .unwrap();
            match outcome {
                SupervisionOutcome::Resolved(report) => assert_eq!(report.compiled_shaders, 7),
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
    }
}
