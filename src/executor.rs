use crate::error::{Result, UpperError};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

pub const SUDO_EXE: &str = "/usr/bin/sudo";

/// A single external command, plus how it should be run and judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
    elevated: bool,
    capture_stdout: bool,
    accepted_exit_codes: BTreeSet<i32>,
    env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            elevated: false,
            capture_stdout: false,
            accepted_exit_codes: BTreeSet::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run through the elevation tool.
    pub fn elevated(mut self) -> Self {
        self.elevated = true;
        self
    }

    /// Read stdout into memory instead of forwarding it to the terminal.
    pub fn capture_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    /// Treat `code` as success in addition to 0.
    pub fn accept_exit_code(mut self, code: i32) -> Self {
        self.accepted_exit_codes.insert(code);
        self
    }

    /// Set `key=value` on top of the inherited environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn accepts(&self, code: Option<i32>) -> bool {
        match code {
            Some(0) => true,
            Some(code) => self.accepted_exit_codes.contains(&code),
            None => false,
        }
    }

    /// Program and arguments as one space-separated string, for error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs invocations to completion.
///
/// Returns the captured stdout when the invocation asked for it, `None`
/// otherwise. An exit status outside the accepted set is an error.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<Option<String>>;
}

/// Runs invocations as real child processes, blocking until they exit.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    elevation_tool: PathBuf,
}

impl SystemRunner {
    pub fn new<P: AsRef<Path>>(elevation_tool: P) -> Self {
        Self {
            elevation_tool: elevation_tool.as_ref().to_path_buf(),
        }
    }

    /// The full argv that will be executed for `invocation`.
    pub fn command_line(&self, invocation: &Invocation) -> Vec<String> {
        let mut argv = Vec::with_capacity(invocation.args.len() + 3);
        if invocation.elevated {
            // `--` keeps the elevation tool from parsing the target's own flags.
            argv.push(self.elevation_tool.display().to_string());
            argv.push("--".to_string());
        }
        argv.push(invocation.program.display().to_string());
        argv.extend(invocation.args.iter().cloned());
        argv
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(SUDO_EXE)
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<Option<String>> {
        let argv = self.command_line(invocation);
        debug!("executing: {}", ShellQuoted(&argv));

        let mut command = Command::new(&argv[0]);
        command
            .args(&argv[1..])
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let spawn_error = |source| UpperError::Spawn {
            command: invocation.display(),
            source,
        };

        let (status, stdout) = if invocation.capture_stdout {
            let output = command
                .stdin(Stdio::inherit())
                .stdout(Stdio::piped())
                .stderr(Stdio::inherit())
                .output()
                .map_err(spawn_error)?;
            (output.status, Some(output.stdout))
        } else {
            (command.status().map_err(spawn_error)?, None)
        };

        if !invocation.accepts(status.code()) {
            return Err(UpperError::CommandFailed {
                command: invocation.display(),
                status,
            });
        }

        stdout
            .map(|bytes| {
                String::from_utf8(bytes).map_err(|source| UpperError::InvalidUtf8 {
                    command: invocation.display(),
                    source,
                })
            })
            .transpose()
    }
}

/// Renders an argv as a line that can be pasted into a POSIX shell.
struct ShellQuoted<'a>(&'a [String]);

impl std::fmt::Display for ShellQuoted<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match shlex::try_join(self.0.iter().map(String::as_str)) {
            Ok(line) => f.write_str(&line),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::capture::logs;
    use tracing::Level;

    fn sh(script: &str) -> Invocation {
        Invocation::new("/bin/sh").args(["-c", script])
    }

    #[test]
    fn exit_zero_is_success() {
        let runner = SystemRunner::default();
        assert_eq!(runner.run(&sh("exit 0")).unwrap(), None);
    }

    #[test]
    fn accepted_exit_codes_are_success() {
        let runner = SystemRunner::default();
        assert!(runner.run(&sh("exit 1").accept_exit_code(1)).is_ok());

        let err = runner.run(&sh("exit 2").accept_exit_code(1)).unwrap_err();
        assert!(matches!(err, UpperError::CommandFailed { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn non_zero_exit_without_accepted_codes_fails() {
        let runner = SystemRunner::default();
        let err = runner.run(&sh("exit 1")).unwrap_err();
        match err {
            UpperError::CommandFailed { command, status } => {
                assert_eq!(command, "/bin/sh -c exit 1");
                assert_eq!(status.code(), Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn captures_stdout_as_text() {
        let runner = SystemRunner::default();
        let stdout = runner
            .run(&sh("printf '{}'; exit 1").capture_stdout().accept_exit_code(1))
            .unwrap();
        assert_eq!(stdout.as_deref(), Some("{}"));
    }

    #[test]
    fn env_overrides_are_merged_into_inherited_environment() {
        let runner = SystemRunner::default();
        let stdout = runner
            .run(
                &sh(r#"printf '%s:%s' "$USE_EMOJI" "${PATH:+inherited}""#)
                    .env("USE_EMOJI", "0")
                    .capture_stdout(),
            )
            .unwrap();
        assert_eq!(stdout.as_deref(), Some("0:inherited"));
    }

    #[test]
    fn missing_executable_is_a_spawn_error() {
        let runner = SystemRunner::default();
        let err = runner
            .run(&Invocation::new("/nonexistent/upper-test-binary"))
            .unwrap_err();
        assert!(matches!(err, UpperError::Spawn { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn elevated_command_line_starts_with_tool_and_separator() {
        let runner = SystemRunner::new("/usr/bin/sudo");
        let invocation = Invocation::new("/usr/bin/snap").arg("refresh").elevated();
        assert_eq!(
            runner.command_line(&invocation),
            vec!["/usr/bin/sudo", "--", "/usr/bin/snap", "refresh"]
        );

        let plain = Invocation::new("/usr/bin/pipx").arg("upgrade-all");
        assert_eq!(
            runner.command_line(&plain),
            vec!["/usr/bin/pipx", "upgrade-all"]
        );
    }

    #[test]
    fn elevation_runs_through_the_configured_tool() {
        // `env` stands in for sudo: it runs its operands after `--`.
        let runner = SystemRunner::new("/usr/bin/env");
        let stdout = runner
            .run(&sh("printf elevated").elevated().capture_stdout())
            .unwrap();
        assert_eq!(stdout.as_deref(), Some("elevated"));
    }

    #[test]
    fn shell_quoting_round_trips_arguments() {
        let argv = vec![
            "/usr/bin/npm".to_string(),
            "install".to_string(),
            "left pad@1.0".to_string(),
        ];
        let line = ShellQuoted(&argv).to_string();
        assert!(line.starts_with("/usr/bin/npm install "));
        assert_eq!(shlex::split(&line), Some(argv));
    }

    #[test]
    fn run_logs_the_quoted_command_only_at_debug_level() {
        let runner = SystemRunner::new("/usr/bin/env");

        let (result, output) = logs(Level::DEBUG, || runner.run(&sh("exit 0").elevated()));
        result.unwrap();
        assert_eq!(
            output,
            "(upper) debug: executing: /usr/bin/env -- /bin/sh -c 'exit 0'\n"
        );

        let (result, output) = logs(Level::INFO, || runner.run(&sh("exit 0").elevated()));
        result.unwrap();
        assert!(output.is_empty());
    }
}
