use std::{
    fs::OpenOptions,
    path::Path,
    process::{Command as StdCommand, Stdio},
};

use crate::executor::ExecutorError;

/// Runs `cmd` through `bash -o pipefail -c` and blocks until it exits.
///
/// With `pipefail` a pipeline fails when any stage fails, not just the last one.
/// Output is captured to `<label>_stdout.log` / `<label>_stderr.log` in `log_dir`.
/// A non-zero exit status is reported as [`ExecutorError::Failed`].
pub fn run(label: &str, cmd: &str, log_dir: &Path) -> Result<(), ExecutorError> {
    let stdout_path = log_dir.join(format!("{}_stdout.log", label));
    let stderr_path = log_dir.join(format!("{}_stderr.log", label));

    let stdout_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&stdout_path)?;

    let stderr_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&stderr_path)?;

    log::info!("Executing shell command ({}): {}", label, cmd);

    let mut child = StdCommand::new("bash")
        .arg("-o")
        .arg("pipefail")
        .arg("-c")
        .arg(cmd)
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file))
        .spawn()
        .map_err(|source| ExecutorError::Spawn {
            label: label.to_string(),
            source,
        })?;

    log::debug!("{} spawned (PID: {})", label, child.id());

    let status = child.wait()?;
    let code = status.code();
    log::info!(
        "{} completed with exit code: {}",
        label,
        code.unwrap_or(-1)
    );

    if status.success() {
        Ok(())
    } else {
        Err(ExecutorError::Failed {
            label: label.to_string(),
            code,
        })
    }
}

/// Single-quotes `arg` for the shell, escaping embedded quotes.
pub fn quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("iss-o-mat-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn captures_output_of_successful_command() {
        let dir = scratch_dir("process-ok");
        run("greet", "echo hello; echo oops >&2", &dir).unwrap();

        let stdout = fs::read_to_string(dir.join("greet_stdout.log")).unwrap();
        let stderr = fs::read_to_string(dir.join("greet_stderr.log")).unwrap();
        assert_eq!(stdout.trim(), "hello");
        assert_eq!(stderr.trim(), "oops");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn non_zero_exit_is_failure() {
        let dir = scratch_dir("process-fail");
        let err = run("broken", "exit 3", &dir).unwrap_err();
        assert!(matches!(err, ExecutorError::Failed { code: Some(3), .. }));
        assert_eq!(err.to_string(), "`broken` exited with code 3");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn failing_producer_fails_the_pipeline() {
        let dir = scratch_dir("process-pipe");
        let err = run(
            "pipe",
            "iss_o_mat_missing_recorder -f 145.8M - | cat > /dev/null",
            &dir,
        )
        .unwrap_err();
        assert!(matches!(err, ExecutorError::Failed { code: Some(127), .. }));

        run("pipe-ok", "echo samples | cat > /dev/null", &dir).unwrap();
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn quoting_survives_the_shell() {
        let dir = scratch_dir("process-quote");
        let tricky = "it's a \"file\" $HOME";
        run("quote", &format!("printf %s {}", quote(tricky)), &dir).unwrap();
        let stdout = fs::read_to_string(dir.join("quote_stdout.log")).unwrap();
        assert_eq!(stdout, tricky);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_log_dir_is_io_error() {
        let err = run("nowhere", "true", Path::new("/nonexistent/iss-o-mat/logs")).unwrap_err();
        assert!(matches!(err, ExecutorError::Io(_)));
    }
}
