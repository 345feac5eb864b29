/// Execution Engine - Running One Harness Script
///
/// **Core Responsibility:**
/// Run a rendered harness script in a fresh external process and capture
/// its raw output under a hard wall-clock limit.
///
/// **Critical Architectural Boundary:**
/// - Engine knows HOW to execute (local interpreter or Docker container)
/// - Engine does NOT parse the result line
/// - Engine does NOT compare anything
/// - A timeout is a normal outcome (`RawRun::timed_out`), not an error
///
/// **Backends:**
/// - `ProcessEngine`: per-run temp directory, cleared environment, stdin
///   closed, child killed and reaped on timeout
/// - `DockerEngine`: one uniquely named container per run, network disabled,
///   memory/CPU limits from the runtime config, force-removed by a drop guard
use crate::config::{Backend, RuntimeConfig};
use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use bollard::container::{
    Config, CreateContainerOptions, KillContainerOptions, LogOutput, LogsOptions,
    RemoveContainerOptions, StartContainerOptions, WaitContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use veritas_common::HarnessError;

/// Per-stream capture: the first `HEAD_CAPTURE_BYTES` and the last
/// `TAIL_CAPTURE_BYTES` are kept, anything in between is dropped. The tail
/// always holds the result line.
const HEAD_CAPTURE_BYTES: usize = 4 * 1024 * 1024;
const TAIL_CAPTURE_BYTES: usize = 4 * 1024 * 1024;
/// How long to wait for pipes to close after the child has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(500);
/// Docker passes the script through environment variables, chunked below
/// the kernel's per-string limit.
const ENV_CHUNK_BYTES: usize = 96 * 1024;
const MAX_DOCKER_SCRIPT_BYTES: usize = 1536 * 1024;

const DOCKER_BOOTSTRAP: &str = "import base64, os; \
exec(compile(base64.b64decode(''.join(os.environ['HARNESS_SCRIPT_%d' % i] \
for i in range(int(os.environ['HARNESS_SCRIPT_PARTS'])))), 'harness', 'exec'))";

/// Raw outcome of one run, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRun {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i64>,
    pub timed_out: bool,
    pub execution_time_ms: u64,
}

impl RawRun {
    fn timed_out(execution_time_ms: u64) -> Self {
        Self {
            timed_out: true,
            execution_time_ms,
            ..Default::default()
        }
    }
}

pub enum Engine {
    Process(ProcessEngine),
    Docker(DockerEngine),
}

impl Engine {
    pub fn for_backend(backend: Backend, runtime: RuntimeConfig) -> Result<Self> {
        Ok(match backend {
            Backend::Process => Engine::Process(ProcessEngine::new(runtime)),
            Backend::Docker => Engine::Docker(DockerEngine::new(runtime)?),
        })
    }

    pub fn backend(&self) -> Backend {
        match self {
            Engine::Process(_) => Backend::Process,
            Engine::Docker(_) => Backend::Docker,
        }
    }

    /// Infrastructure problems (interpreter missing, Docker unreachable)
    /// come back as `ExecutionError`.
    pub async fn run(&self, script: &str, timeout_ms: u64) -> Result<RawRun, HarnessError> {
        let result = match self {
            Engine::Process(engine) => engine.execute(script, timeout_ms).await,
            Engine::Docker(engine) => engine.execute(script, timeout_ms).await,
        };
        result.map_err(|e| HarnessError::Execution(format!("{:#}", e)))
    }
}

/// Bounded capture of one output stream.
#[derive(Default)]
struct CappedOutput {
    head: Vec<u8>,
    tail: VecDeque<u8>,
    dropped: u64,
}

impl CappedOutput {
    fn push(&mut self, mut bytes: &[u8]) {
        if self.head.len() < HEAD_CAPTURE_BYTES {
            let take = bytes.len().min(HEAD_CAPTURE_BYTES - self.head.len());
            self.head.extend_from_slice(&bytes[..take]);
            bytes = &bytes[take..];
        }
        self.tail.extend(bytes);
        if self.tail.len() > TAIL_CAPTURE_BYTES {
            let excess = self.tail.len() - TAIL_CAPTURE_BYTES;
            self.tail.drain(..excess);
            self.dropped += excess as u64;
        }
    }

    fn finish(self) -> String {
        let mut bytes = self.head;
        if self.dropped > 0 {
            bytes.extend_from_slice(
                format!("\n[{} bytes of output dropped]\n", self.dropped).as_bytes(),
            );
        }
        bytes.extend(self.tail);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

async fn read_capped<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut output = CappedOutput::default();
    let mut buf = vec![0u8; 64 * 1024];
    // read to EOF so the child never blocks on a full pipe
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => output.push(&buf[..n]),
            Err(e) => {
                debug!(error = %e, "Output stream closed with error");
                break;
            }
        }
    }
    output.finish()
}

async fn drain(mut task: JoinHandle<String>) -> String {
    match tokio::time::timeout(DRAIN_GRACE, &mut task).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            warn!(error = %e, "Output reader task failed");
            String::new()
        }
        Err(_) => {
            // a grandchild still holds the pipe open
            task.abort();
            String::new()
        }
    }
}

/// Local interpreter engine.
pub struct ProcessEngine {
    runtime: RuntimeConfig,
    scratch_root: PathBuf,
}

impl ProcessEngine {
    pub fn new(runtime: RuntimeConfig) -> Self {
        Self {
            runtime,
            scratch_root: std::env::temp_dir(),
        }
    }

    /// Create per-run directories under `root` instead of the system temp dir.
    pub fn in_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }

    pub async fn execute(&self, script: &str, timeout_ms: u64) -> Result<RawRun> {
        // Removed on every exit path when `workdir` drops.
        let workdir = tempfile::Builder::new()
            .prefix("veritas-")
            .tempdir_in(&self.scratch_root)
            .context("Failed to create run directory")?;
        let script_path = workdir
            .path()
            .join(format!("harness.{}", self.runtime.file_extension));
        tokio::fs::write(&script_path, script)
            .await
            .context("Failed to write harness script")?;

        let path_env = std::env::var("PATH")
            .unwrap_or_else(|_| "/usr/local/bin:/usr/bin:/bin".to_string());

        let start_time = Instant::now();
        let mut child = Command::new(&self.runtime.command)
            .args(&self.runtime.args)
            .arg(&script_path)
            .current_dir(workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env_clear()
            .env("PATH", &path_env)
            .env("PYTHONIOENCODING", "utf-8")
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start interpreter `{}`", self.runtime.command))?;

        let stdout = child.stdout.take().context("Child stdout was not captured")?;
        let stderr = child.stderr.take().context("Child stderr was not captured")?;
        let stdout_task = tokio::spawn(read_capped(stdout));
        let stderr_task = tokio::spawn(read_capped(stderr));

        let waited = tokio::time::timeout(Duration::from_millis(timeout_ms), child.wait()).await;
        let execution_time_ms = start_time.elapsed().as_millis() as u64;

        let status = match waited {
            Ok(status) => status.context("Failed to wait for interpreter")?,
            Err(_) => {
                warn!(timeout_ms, "Execution timed out - killing process");
                // kill() also reaps the child
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed-out process");
                }
                stdout_task.abort();
                stderr_task.abort();
                return Ok(RawRun::timed_out(execution_time_ms));
            }
        };

        let stdout = drain(stdout_task).await;
        let stderr = drain(stderr_task).await;

        debug!(
            exit_code = ?status.code(),
            execution_time_ms,
            stdout_bytes = stdout.len(),
            "Process finished"
        );

        Ok(RawRun {
            stdout,
            stderr,
            exit_code: status.code().map(i64::from),
            timed_out: false,
            execution_time_ms,
        })
    }
}

/// Container cleanup guard - guarantees container removal on drop
/// This ensures containers are cleaned up even if execution panics or is cancelled
struct ContainerGuard<'a> {
    docker: &'a Docker,
    container_id: String,
}

impl<'a> ContainerGuard<'a> {
    fn new(docker: &'a Docker, container_id: String) -> Self {
        Self {
            docker,
            container_id,
        }
    }
}

impl<'a> Drop for ContainerGuard<'a> {
    fn drop(&mut self) {
        // Best-effort cleanup - cannot be async in Drop
        let container_id = self.container_id.clone();
        let docker = self.docker.clone();

        tokio::spawn(async move {
            let remove_options = RemoveContainerOptions {
                force: true,
                ..Default::default()
            };

            if let Err(e) = docker.remove_container(&container_id, Some(remove_options)).await {
                warn!(container_id = %container_id, error = %e, "Failed to clean up container");
            }
        });
    }
}

/// Docker-based engine: one disposable container per run.
pub struct DockerEngine {
    docker: Docker,
    runtime: RuntimeConfig,
}

impl DockerEngine {
    pub fn new(runtime: RuntimeConfig) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .context("Failed to connect to Docker daemon")?;
        Ok(Self { docker, runtime })
    }

    /// Ensure Docker image is available (pull if needed)
    async fn ensure_image(&self, image: &str) -> Result<()> {
        if self.docker.inspect_image(image).await.is_ok() {
            debug!(image, "Image cache hit");
            return Ok(());
        }

        warn!(image, "Image cache miss, pulling");
        let options = Some(CreateImageOptions {
            from_image: image,
            ..Default::default()
        });

        let mut stream = self.docker.create_image(options, None, None);
        while let Some(result) = stream.next().await {
            result.context("Failed to pull Docker image")?;
        }

        info!(image, "Image pulled");
        Ok(())
    }

    pub async fn execute(&self, script: &str, timeout_ms: u64) -> Result<RawRun> {
        let env = script_env(script)?;
        let image = self.runtime.image.clone();
        let container_name = format!("veritas-{}", uuid::Uuid::new_v4());

        self.ensure_image(&image)
            .await
            .with_context(|| format!("Failed to ensure Docker image '{}' is available", image))?;

        let config = Config {
            image: Some(image.clone()),
            cmd: Some(container_command(&self.runtime)),
            env: Some(env),
            working_dir: Some("/tmp".to_string()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            network_disabled: Some(true),
            host_config: Some(bollard::models::HostConfig {
                memory: Some(self.runtime.memory_limit_bytes()),
                nano_cpus: Some(self.runtime.nano_cpus()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let create_options = CreateContainerOptions {
            name: container_name.as_str(),
            platform: None,
        };

        let container = self
            .docker
            .create_container(Some(create_options), config)
            .await
            .context("Failed to create Docker container")?;
        let container_id = container.id.clone();

        // Set up the cleanup guard immediately after creation
        let _guard = ContainerGuard::new(&self.docker, container_id.clone());

        let start_time = Instant::now();
        self.docker
            .start_container(&container_id, None::<StartContainerOptions<String>>)
            .await
            .context("Failed to start Docker container")?;

        let execution_future = async {
            let mut stdout = CappedOutput::default();
            let mut stderr = CappedOutput::default();

            let logs_options = Some(LogsOptions::<String> {
                stdout: true,
                stderr: true,
                follow: true,
                ..Default::default()
            });
            let mut logs_stream = self.docker.logs(&container_id, logs_options);
            while let Some(output) = logs_stream.next().await {
                match output {
                    Ok(LogOutput::StdOut { message }) => stdout.push(&message),
                    Ok(LogOutput::StdErr { message }) => stderr.push(&message),
                    Err(e) => {
                        warn!(error = %e, "Error reading container logs");
                        break;
                    }
                    _ => {}
                }
            }

            let wait_options = WaitContainerOptions {
                condition: "not-running",
            };
            let mut wait_stream = self.docker.wait_container(&container_id, Some(wait_options));
            let exit_code = match wait_stream.next().await {
                Some(Ok(response)) => Some(response.status_code),
                // non-zero exits surface as an error carrying the code
                Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => Some(code),
                Some(Err(e)) => {
                    warn!(error = %e, "Failed to get container exit code");
                    None
                }
                None => None,
            };

            (stdout.finish(), stderr.finish(), exit_code)
        };

        let timeout_result =
            tokio::time::timeout(Duration::from_millis(timeout_ms), execution_future).await;
        let execution_time_ms = start_time.elapsed().as_millis() as u64;

        match timeout_result {
            Ok((stdout, mut stderr, exit_code)) => {
                if exit_code == Some(137) {
                    stderr.push_str("\n[Container killed: likely OOM or exceeded memory limit]");
                }
                Ok(RawRun {
                    stdout,
                    stderr,
                    exit_code,
                    timed_out: false,
                    execution_time_ms,
                })
            }
            Err(_) => {
                warn!(timeout_ms, container = %container_name, "Execution timed out - killing container");
                if let Err(e) = self
                    .docker
                    .kill_container(&container_id, None::<KillContainerOptions<String>>)
                    .await
                {
                    warn!(error = %e, "Failed to kill timed-out container");
                }
                Ok(RawRun::timed_out(execution_time_ms))
            }
        }
    }
}

/// Interpreter invocation inside the container; the script arrives via `script_env`.
fn container_command(runtime: &RuntimeConfig) -> Vec<String> {
    let mut cmd = vec![runtime.command.clone()];
    cmd.extend(runtime.args.iter().cloned());
    cmd.push("-c".to_string());
    cmd.push(DOCKER_BOOTSTRAP.to_string());
    cmd
}

fn script_env(script: &str) -> Result<Vec<String>> {
    let encoded = general_purpose::STANDARD.encode(script);
    if encoded.len() > MAX_DOCKER_SCRIPT_BYTES {
        bail!(
            "Harness script of {} encoded bytes exceeds the docker backend limit of {}",
            encoded.len(),
            MAX_DOCKER_SCRIPT_BYTES
        );
    }

    let chunks: Vec<&[u8]> = encoded.as_bytes().chunks(ENV_CHUNK_BYTES).collect();
    let mut env = vec![format!("HARNESS_SCRIPT_PARTS={}", chunks.len())];
    for (i, chunk) in chunks.iter().enumerate() {
        env.push(format!("HARNESS_SCRIPT_{}={}", i, String::from_utf8_lossy(chunk)));
    }
    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_env_round_trip() {
        let script = "print('x')\n".repeat(20_000);
        let env = script_env(&script).unwrap();
        let parts: usize = env[0].trim_start_matches("HARNESS_SCRIPT_PARTS=").parse().unwrap();
        assert_eq!(parts, env.len() - 1);
        assert!(parts > 1);

        let joined: String = env[1..]
            .iter()
            .enumerate()
            .map(|(i, kv)| kv.trim_start_matches(&format!("HARNESS_SCRIPT_{}=", i)).to_string())
            .collect();
        let decoded = general_purpose::STANDARD.decode(joined).unwrap();
        assert_eq!(decoded, script.as_bytes());
    }

    #[test]
    fn test_script_env_rejects_oversized() {
        let script = "x".repeat(MAX_DOCKER_SCRIPT_BYTES);
        assert!(script_env(&script).is_err());
    }

    #[test]
    fn test_docker_command_uses_runtime() {
        let cmd = container_command(&RuntimeConfig::python());
        assert_eq!(cmd, vec!["python3", "-I", "-c", DOCKER_BOOTSTRAP]);
        assert!(DOCKER_BOOTSTRAP.contains("HARNESS_SCRIPT_PARTS"));

        let mut runtime = RuntimeConfig::python();
        runtime.command = "python3.12".to_string();
        runtime.args.clear();
        assert_eq!(container_command(&runtime)[..2], ["python3.12", "-c"]);
    }

    #[tokio::test]
    async fn test_capture_keeps_small_output_whole() {
        let output = read_capped(&b"a\nb\n{\"cases\":[]}\n"[..]).await;
        assert_eq!(output, "a\nb\n{\"cases\":[]}\n");
    }

    #[tokio::test]
    async fn test_capture_keeps_result_line_after_heavy_output() {
        let result_line = r#"{"cases":[{"case":1,"status":"ok","value":{"$v":1}}]}"#;
        let mut data = "log line\n".repeat((HEAD_CAPTURE_BYTES + TAIL_CAPTURE_BYTES) / 9 + 100_000);
        data.push('\n');
        data.push_str(result_line);
        data.push('\n');

        let output = read_capped(data.as_bytes()).await;
        assert!(output.len() < data.len());
        assert!(output.starts_with("log line\n"));
        assert!(output.contains("bytes of output dropped]"));
        assert_eq!(output.lines().last(), Some(result_line));
    }
}
