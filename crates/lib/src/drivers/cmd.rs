//! Shell command execution for build steps.

use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

use crate::context::BuildContext;
use crate::error::BuildError;

/// ZIP epoch (1980-01-01T00:00:00Z), exported as `SOURCE_DATE_EPOCH`.
const SOURCE_DATE_EPOCH: &str = "315532800";

/// Run the product's compile command from the product directory.
///
/// Returns `Ok(None)` when the product declares no command.
pub async fn run_compile_command(ctx: &BuildContext) -> Result<Option<String>, BuildError> {
  let Some(cmd) = ctx.product().compile_command.as_deref() else {
    info!("product has no compile command, nothing to compile");
    return Ok(None);
  };
  let home = &ctx.product().home;
  let cwd = (!home.as_os_str().is_empty()).then_some(home.as_path());
  execute_cmd(cmd, cwd, ctx.output_dir(), None).await.map(Some)
}

/// Execute `cmd` through the platform shell.
///
/// The parent environment is inherited. On top of it the command sees:
/// - `out` set to the build output directory, made absolute
/// - `TMPDIR`/`TMP`/`TEMP` pointing at `<out_dir>/tmp`
/// - `SOURCE_DATE_EPOCH` fixed for reproducible timestamps
///
/// Returns the trimmed stdout on success.
pub async fn execute_cmd(cmd: &str, cwd: Option<&Path>, out_dir: &Path, shell: Option<&str>) -> Result<String, BuildError> {
  info!(cmd = %cmd, "executing command");

  // The child may run elsewhere, so paths handed to it cannot be relative
  let out_dir = std::path::absolute(out_dir).map_err(|e| BuildError::io(out_dir, e))?;
  let tmp_dir = out_dir.join("tmp");
  tokio::fs::create_dir_all(&tmp_dir)
    .await
    .map_err(|e| BuildError::io(&tmp_dir, e))?;

  let (shell_cmd, shell_args) = get_shell(shell);
  let working_dir = cwd.unwrap_or(out_dir.as_path());

  let mut command = Command::new(&shell_cmd);
  command
    .args(&shell_args)
    .arg(cmd)
    .current_dir(working_dir)
    .env("out", &out_dir)
    .env("TMPDIR", &tmp_dir)
    .env("TMP", &tmp_dir)
    .env("TEMP", &tmp_dir)
    .env("SOURCE_DATE_EPOCH", SOURCE_DATE_EPOCH);

  debug!(shell = %shell_cmd, working_dir = ?working_dir, "spawning process");

  let output = command.output().await.map_err(|e| BuildError::io(&shell_cmd, e))?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }
    return Err(BuildError::CmdFailed {
      cmd: cmd.to_string(),
      code: output.status.code(),
    });
  }

  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
  if !stdout.is_empty() {
    debug!(stdout = %stdout, "command output");
  }
  Ok(stdout)
}

/// Shell program and the arguments that precede the command string.
fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if shell.contains("powershell") || shell.contains("pwsh") {
      powershell_args()
    } else if shell.contains("cmd") {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    ("powershell.exe".to_string(), powershell_args())
  }
}

fn powershell_args() -> Vec<String> {
  ["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command"]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
