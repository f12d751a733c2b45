use crate::command::{BuiltinIo, Flow};
use crate::env::Environment;
use crate::parser::is_operator;
use anyhow::{Context, Result, anyhow, bail};
use argh::{EarlyExit, FromArgs};
use std::fs;
use std::path::{Path, PathBuf};

/// The fixed set of commands executed inside the shell process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Dir,
    Pwd,
    Type,
    Echo,
    Help,
    Exit,
}

impl Builtin {
    /// Every built-in, in the order `help` lists them.
    pub const ALL: [Builtin; 7] = [
        Builtin::Cd,
        Builtin::Dir,
        Builtin::Pwd,
        Builtin::Type,
        Builtin::Echo,
        Builtin::Help,
        Builtin::Exit,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Dir => "dir",
            Builtin::Pwd => "pwd",
            Builtin::Type => "type",
            Builtin::Echo => "echo",
            Builtin::Help => "help",
            Builtin::Exit => "exit",
        }
    }

    /// One-line description shown by `help <name>`.
    pub fn description(self, root: &Path) -> String {
        match self {
            Builtin::Cd => format!(
                "cd [directory]: Change the current directory to 'directory'. \
                 If no directory is provided, changes to the root directory {}.",
                root.display()
            ),
            Builtin::Dir => "dir [directory]: List the contents of 'directory'. \
                 If no directory is provided, lists the contents of the current directory."
                .to_string(),
            Builtin::Pwd => "pwd: Print the current working directory.".to_string(),
            Builtin::Type => "type [file]: Display the contents of 'file'.".to_string(),
            Builtin::Echo => "echo [text]: Display a line of text.".to_string(),
            Builtin::Help => {
                "help [command]: Display information about builtin commands.".to_string()
            }
            Builtin::Exit => "exit: Exit the shell.".to_string(),
        }
    }

    /// Whether the built-in may have its output captured into a file.
    ///
    /// `cd` and `exit` act on the shell itself and produce no output to capture.
    pub fn supports_redirection(self) -> bool {
        !matches!(self, Builtin::Cd | Builtin::Exit)
    }

    /// Run the built-in. `args[0]` is the command name.
    pub fn run(self, args: &[&str], io: &mut BuiltinIo, env: &Environment) -> Flow {
        log::debug!("builtin {} {:?}", self.name(), args.get(1..));
        match self {
            Builtin::Cd => invoke::<Cd>(args, io, env),
            Builtin::Dir => invoke::<Dir>(args, io, env),
            Builtin::Pwd => invoke::<Pwd>(args, io, env),
            Builtin::Type => invoke::<Type>(args, io, env),
            Builtin::Echo => invoke::<Echo>(args, io, env),
            Builtin::Help => invoke::<Help>(args, io, env),
            Builtin::Exit => invoke::<Exit>(args, io, env),
        }
    }
}

/// A built-in's parsed arguments together with its behaviour.
///
/// Operands are parsed with [`argh`]; an `Err` from `execute` is a user error,
/// reported on the error stream, after which the shell carries on.
trait BuiltinCommand: Sized + FromArgs {
    const KIND: Builtin;

    fn execute(self, io: &mut BuiltinIo, env: &Environment) -> Result<Flow>;
}

fn invoke<T: BuiltinCommand>(args: &[&str], io: &mut BuiltinIo, env: &Environment) -> Flow {
    let name = T::KIND.name();
    let operands = args.get(1..).unwrap_or_default();
    // Everything but a lone `--help` is an operand, even `help` or `-x`.
    let parsed = if operands == ["--help"] {
        T::from_args(&[name], operands)
    } else {
        let positional: Vec<&str> = std::iter::once("--").chain(operands.iter().copied()).collect();
        T::from_args(&[name], &positional)
    };
    let cmd = match parsed {
        Ok(cmd) => cmd,
        Err(EarlyExit { output, status }) => {
            let written = if status.is_ok() {
                output.lines().try_for_each(|line| io.line(line))
            } else {
                io.error(&format!("{name}: {}", output.trim_end()))
            };
            if let Err(e) = written {
                log::warn!("{name}: could not write usage: {e}");
            }
            return Flow::Continue;
        }
    };
    match cmd.execute(io, env) {
        Ok(flow) => flow,
        Err(e) => {
            if let Err(write_err) = io.error(&e.to_string()) {
                log::warn!("{name}: could not report {e:#}: {write_err}");
            }
            Flow::Continue
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional, greedy)]
    /// directory to switch to; the root directory when omitted.
    pub operands: Vec<String>,
}

impl BuiltinCommand for Cd {
    const KIND: Builtin = Builtin::Cd;

    fn execute(self, _io: &mut BuiltinIo, env: &Environment) -> Result<Flow> {
        let target = match self.operands.first() {
            Some(dir) => PathBuf::from(dir),
            None => env.root_dir().to_path_buf(),
        };
        std::env::set_current_dir(&target).with_context(|| {
            format!("cd: failed to change directory to {}.", target.display())
        })?;
        log::debug!("cd: now in {}", target.display());
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// List the entries of a directory.
pub struct Dir {
    #[argh(positional, greedy)]
    /// directory to list; the current directory when omitted.
    pub operands: Vec<String>,
}

impl BuiltinCommand for Dir {
    const KIND: Builtin = Builtin::Dir;

    fn execute(self, io: &mut BuiltinIo, _env: &Environment) -> Result<Flow> {
        let path = self.operands.first().map(String::as_str).unwrap_or(".");
        let entries = fs::read_dir(path).with_context(|| {
            format!("dir: cannot access '{path}': No such file or directory")
        })?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name != "." && name != "..")
            .collect();
        names.sort();
        for name in names {
            io.line(&name)?;
        }
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Print the current working directory.
pub struct Pwd {
    #[argh(positional, greedy)]
    /// ignored.
    pub _operands: Vec<String>,
}

impl BuiltinCommand for Pwd {
    const KIND: Builtin = Builtin::Pwd;

    fn execute(self, io: &mut BuiltinIo, env: &Environment) -> Result<Flow> {
        let cwd = env.current_dir().map_err(|e| {
            anyhow!(
                "pwd: error retrieving current directory. Error code: {}",
                e.raw_os_error().unwrap_or(0)
            )
        })?;
        io.line(&cwd.to_string_lossy())?;
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Print the contents of a file.
pub struct Type {
    #[argh(positional, greedy)]
    /// file to print.
    pub operands: Vec<String>,
}

impl BuiltinCommand for Type {
    const KIND: Builtin = Builtin::Type;

    fn execute(self, io: &mut BuiltinIo, _env: &Environment) -> Result<Flow> {
        let Some(file) = self.operands.first() else {
            bail!("type: missing operand");
        };
        let contents =
            fs::read(file).with_context(|| format!("type: cannot open file '{file}'"))?;
        io.stdout.write_all(&contents)?;
        if !contents.is_empty() && !contents.ends_with(b"\n") {
            io.stdout.write_all(io.eol.as_bytes())?;
        }
        Ok(Flow::Continue)
    }
}

/// Print the operands separated by spaces.
///
/// Takes its operands verbatim, so text that looks like a flag is echoed too.
pub struct Echo {
    pub words: Vec<String>,
}

impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        // Drop the separator added by `invoke`, keep everything after it.
        let args = args.strip_prefix(&["--"]).unwrap_or(args);
        Ok(Echo {
            words: args.iter().map(|word| word.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    const KIND: Builtin = Builtin::Echo;

    fn execute(self, io: &mut BuiltinIo, _env: &Environment) -> Result<Flow> {
        let text = self
            .words
            .iter()
            .map(String::as_str)
            .take_while(|word| !is_operator(word))
            .collect::<Vec<_>>()
            .join(" ");
        io.line(&text)?;
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Describe the built-in commands.
pub struct Help {
    #[argh(positional, greedy)]
    /// built-in to describe; lists them all when omitted.
    pub operands: Vec<String>,
}

impl BuiltinCommand for Help {
    const KIND: Builtin = Builtin::Help;

    fn execute(self, io: &mut BuiltinIo, env: &Environment) -> Result<Flow> {
        if let Some(name) = self.operands.first() {
            let text = match Builtin::from_name(name) {
                Some(builtin) => builtin.description(env.root_dir()),
                None => format!("No help available for '{name}'."),
            };
            io.line(&text)?;
            return Ok(Flow::Continue);
        }

        io.line("Type program names and arguments, and hit enter.")?;
        io.line("The following are built in:")?;
        for builtin in Builtin::ALL {
            io.line(&format!("  {}", builtin.name()))?;
        }
        io.line("")?;
        io.line("Use the help command with a program name for more information on the program.")?;
        Ok(Flow::Continue)
    }
}

/// Leave the shell. Any operands are ignored.
pub struct Exit;

impl FromArgs for Exit {
    fn from_args(_command_name: &[&str], _args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Exit)
    }
}

impl BuiltinCommand for Exit {
    const KIND: Builtin = Builtin::Exit;

    fn execute(self, _io: &mut BuiltinIo, _env: &Environment) -> Result<Flow> {
        Ok(Flow::Exit)
    }
}
