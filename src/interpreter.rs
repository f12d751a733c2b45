use crate::command::{BuiltinIo, Flow, OutputSink};
use crate::env::Environment;
use crate::external;
use crate::lexer::{self, ArgumentVector};
use crate::parser::{self, Dispatch};
use crate::redirect;
use anyhow::Result;
use std::io::Write;

/// Somewhere to read command lines from.
pub trait LineSource {
    /// Show `prompt` and read one line, without its line terminator.
    ///
    /// Returns `None` once input is exhausted.
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// The interactive shell: reads lines, dispatches them, and stops on `exit`.
///
/// Example
/// ```
/// use minishell::{Environment, Flow, Interpreter};
/// let mut sh = Interpreter::new(Environment::new("/"));
/// let mut out = Vec::new();
/// let mut err = Vec::new();
/// let flow = sh.execute_line_with_output("echo hello   world", &mut out, &mut err);
/// assert_eq!(flow, Flow::Continue);
/// assert_eq!(out, b"hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
}

impl Interpreter {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Switch to the configured root directory, as a bare `cd` would.
    pub fn change_to_root(&mut self) -> Flow {
        self.execute_line("cd")
    }

    /// Run one line with built-in output on the process's stdout and stderr.
    pub fn execute_line(&mut self, line: &str) -> Flow {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        self.execute_line_with_output(line, &mut stdout.lock(), &mut stderr.lock())
    }

    /// Run one line, sending built-in console output and diagnostics to the given writers.
    ///
    /// Child processes started without a redirection still inherit the shell's
    /// own console streams.
    pub fn execute_line_with_output(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Flow {
        let args = lexer::split_into_tokens(line);
        let flow = self.dispatch(&args, stdout, stderr);
        if let Err(e) = stdout.flush() {
            log::warn!("could not flush output: {e}");
        }
        flow
    }

    fn dispatch(
        &mut self,
        args: &ArgumentVector,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Flow {
        let decision = parser::classify(args);
        log::debug!("dispatch {:?}", decision);
        match decision {
            Dispatch::Empty => Flow::Continue,
            Dispatch::Redirected(redirection) => {
                redirect::run_redirected(args, &redirection, &self.env, stderr)
            }
            Dispatch::Builtin(builtin) => {
                let mut io = BuiltinIo::console(stdout, stderr);
                builtin.run(&args.as_strs(), &mut io, &self.env)
            }
            Dispatch::External => {
                // Keep our buffered output ahead of the child's.
                if let Err(e) = stdout.flush() {
                    log::warn!("could not flush output: {e}");
                }
                external::launch(args, OutputSink::Console, &self.env, stderr)
            }
        }
    }

    /// The prompt: the working directory followed by `> `.
    pub fn prompt(&self) -> String {
        match self.env.current_dir() {
            Ok(dir) => format!("{}> ", dir.display()),
            Err(_) => "> ".to_string(),
        }
    }

    /// Read-eval loop. Returns when `exit` runs or input runs out.
    pub fn repl(&mut self, input: &mut dyn LineSource) -> Result<()> {
        loop {
            let prompt = self.prompt();
            let Some(line) = input.next_line(&prompt)? else {
                log::debug!("end of input");
                return Ok(());
            };
            if !self.execute_line(&line).should_continue() {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::VecDeque;
    use std::fs;

    struct Scripted {
        lines: VecDeque<String>,
        prompts: Vec<String>,
    }

    impl Scripted {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                prompts: Vec::new(),
            }
        }
    }

    impl LineSource for Scripted {
        fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
            self.prompts.push(prompt.to_string());
            Ok(self.lines.pop_front())
        }
    }

    fn run(sh: &mut Interpreter, line: &str) -> (Flow, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let flow = sh.execute_line_with_output(line, &mut out, &mut err);
        (
            flow,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn blank_lines_do_nothing() {
        let mut sh = Interpreter::new(Environment::new("/"));
        for line in ["", "   ", "\t\r\n"] {
            let (flow, out, err) = run(&mut sh, line);
            assert_eq!(flow, Flow::Continue);
            assert!(out.is_empty() && err.is_empty());
        }
    }

    #[test]
    fn exit_stops_with_or_without_operands() {
        let mut sh = Interpreter::new(Environment::new("/"));
        assert_eq!(run(&mut sh, "exit").0, Flow::Exit);
        assert_eq!(run(&mut sh, "exit now please").0, Flow::Exit);
    }

    #[test]
    fn redirected_echo_writes_nothing_to_console() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        let mut sh = Interpreter::new(Environment::new("/"));
        let (flow, out, err) = run(&mut sh, &format!("echo a b c > {}", target.display()));
        assert_eq!(flow, Flow::Continue);
        assert!(out.is_empty());
        assert!(err.is_empty());
        assert_eq!(fs::read(&target).unwrap(), b"a b c\r\n");
    }

    #[test]
    fn type_of_missing_file_does_not_stop_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let mut sh = Interpreter::new(Environment::new("/"));
        let (flow, out, err) = run(
            &mut sh,
            &format!("type {}", dir.path().join("missing.txt").display()),
        );
        assert_eq!(flow, Flow::Continue);
        assert!(out.is_empty());
        assert!(err.starts_with("shell: type: cannot open file"), "{err}");
    }

    #[test]
    fn unknown_command_reports_spawn_failure() {
        let mut sh = Interpreter::new(Environment::new("/"));
        let (flow, _, err) = run(&mut sh, "no-such-program-for-minishell --flag");
        assert_eq!(flow, Flow::Continue);
        assert!(err.starts_with("shell: command failed ("), "{err}");
    }

    #[test]
    #[serial]
    fn bare_cd_then_pwd_reports_root() {
        let orig = std::env::current_dir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let root_path = fs::canonicalize(root.path()).unwrap();
        let mut sh = Interpreter::new(Environment::new(&root_path));

        assert_eq!(sh.change_to_root(), Flow::Continue);
        let (_, out, _) = run(&mut sh, "pwd");
        assert_eq!(fs::canonicalize(out.trim_end()).unwrap(), root_path);
        assert!(sh.prompt().ends_with("> "));
        assert!(sh.prompt().contains(&*root_path.to_string_lossy()));

        std::env::set_current_dir(orig).unwrap();
    }

    #[test]
    fn repl_stops_at_exit() {
        let mut sh = Interpreter::new(Environment::new("/"));
        let mut input = Scripted::new(&["", "exit", "echo never"]);
        sh.repl(&mut input).unwrap();
        assert_eq!(input.prompts.len(), 2);
        assert_eq!(input.lines.len(), 1);
    }

    #[test]
    fn repl_stops_at_end_of_input() {
        let mut sh = Interpreter::new(Environment::new("/"));
        let mut input = Scripted::new(&["", " "]);
        sh.repl(&mut input).unwrap();
        assert_eq!(input.prompts.len(), 3);
        assert!(input.prompts.iter().all(|p| p.ends_with("> ")));
    }
}
