//! Execution target: the fixed argv prefix a command runs inside.

use std::process::{Command, Stdio};

use crate::error::ShellPagerError;
use crate::Result;

/// Container the default target executes in.
pub const DEFAULT_CONTAINER: &str = "evalbot_sandbox";

/// Argument template that receives the user command as its final argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionTarget {
    program: String,
    args: Vec<String>,
}

impl ExecutionTarget {
    /// Build a target from a full argv template such as `["bash", "-c"]`.
    pub fn new<I, S>(template: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = template.into_iter().map(Into::into);
        let program = parts.next().ok_or(ShellPagerError::InvalidTarget)?;
        if program.is_empty() {
            return Err(ShellPagerError::InvalidTarget);
        }
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Run commands with the host `sh -c`.
    pub fn local_shell() -> Self {
        Self {
            program: "sh".to_string(),
            args: vec!["-c".to_string()],
        }
    }

    /// Run commands with `bash -c` inside a running docker container.
    pub fn docker(container: impl Into<String>) -> Self {
        Self {
            program: "docker".to_string(),
            args: vec![
                "exec".to_string(),
                "-i".to_string(),
                container.into(),
                "bash".to_string(),
                "-c".to_string(),
            ],
        }
    }

    /// Program the template starts with.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The template as given, without a command.
    pub fn template(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Full argv for running `command`.
    pub fn argv(&self, command: &str) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .chain(std::iter::once(command.to_string()))
            .collect()
    }

    /// Process builder with all three standard streams piped.
    pub fn command_for(&self, command: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Default for ExecutionTarget {
    fn default() -> Self {
        Self::docker(DEFAULT_CONTAINER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_argv() {
        let target = ExecutionTarget::new(["bash", "-lc"]).unwrap();
        assert_eq!(target.program(), "bash");
        assert_eq!(target.argv("ls -la"), vec!["bash", "-lc", "ls -la"]);
    }

    #[test]
    fn test_empty_template_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            ExecutionTarget::new(empty),
            Err(ShellPagerError::InvalidTarget)
        ));
        assert!(ExecutionTarget::new([""]).is_err());
    }

    #[test]
    fn test_default_is_sandbox() {
        let argv = ExecutionTarget::default().argv("uname");
        assert_eq!(
            argv,
            vec!["docker", "exec", "-i", DEFAULT_CONTAINER, "bash", "-c", "uname"]
        );
    }

    #[test]
    fn test_command_is_single_argument() {
        let argv = ExecutionTarget::local_shell().argv("echo a; echo b");
        assert_eq!(argv.len(), 3);
        assert_eq!(argv[2], "echo a; echo b");
    }
}
