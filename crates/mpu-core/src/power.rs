//! Host power-off after a finished run (`--shutdown yes`).

use anyhow::{bail, Context, Result};
use std::process::Command;

/// Platform command that powers off the host immediately.
pub fn default_power_off_command() -> Vec<String> {
    let argv: &[&str] = if cfg!(windows) {
        &["shutdown", "/s", "/t", "0"]
    } else {
        &["shutdown", "-h", "now"]
    };
    argv.iter().map(|s| s.to_string()).collect()
}

/// Whether a `--shutdown` value asks for power-off. Only `yes` does.
pub fn shutdown_requested(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some(v) if v.eq_ignore_ascii_case("yes"))
}

/// Run `argv` (or the platform default when None) and wait for it.
pub fn power_off(argv: Option<&[String]>) -> Result<()> {
    let default_cmd;
    let argv = match argv {
        Some(argv) => argv,
        None => {
            default_cmd = default_power_off_command();
            default_cmd.as_slice()
        }
    };
    let Some((program, args)) = argv.split_first() else {
        bail!("shutdown command is empty");
    };
    tracing::warn!("powering off host: {}", argv.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("run {}", program))?;
    if !status.success() {
        bail!("{} exited with {}", argv.join(" "), status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yes_requests_shutdown() {
        assert!(shutdown_requested(Some("yes")));
        assert!(shutdown_requested(Some("YES")));
        assert!(!shutdown_requested(Some("no")));
        assert!(!shutdown_requested(Some("y")));
        assert!(!shutdown_requested(None));
    }

    #[test]
    fn default_command_is_not_empty() {
        let cmd = default_power_off_command();
        assert_eq!(cmd[0], "shutdown");
        assert!(cmd.len() > 1);
    }

    #[test]
    fn empty_command_is_rejected() {
        let empty: Vec<String> = Vec::new();
        let err = power_off(Some(empty.as_slice())).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_reported() {
        let argv = vec!["false".to_string()];
        assert!(power_off(Some(argv.as_slice())).is_err());
        let argv = vec!["true".to_string()];
        assert!(power_off(Some(argv.as_slice())).is_ok());
    }
}
