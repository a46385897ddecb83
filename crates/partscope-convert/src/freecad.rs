//! Out-of-process conversion through a FreeCAD command-line executable.

use std::io::{self, Write};
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StrategyFailure;
use crate::process::run_with_timeout;
use crate::strategy::{clear_output, verify_output, ExchangeConverter};

/// An executable to try, optionally with leading arguments.
///
/// In TOML either a bare string (`"freecadcmd"`) or an array whose first
/// element is the program (`["flatpak", "run", "--command=FreeCADCmd",
/// "org.freecad.FreeCAD"]`). The script path is appended last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    /// A program name or path.
    Program(String),
    /// Program followed by arguments.
    WithArgs(Vec<String>),
}

impl CommandSpec {
    fn parts(&self) -> Option<(&str, &[String])> {
        match self {
            CommandSpec::Program(program) => Some((program.as_str(), &[][..])),
            CommandSpec::WithArgs(parts) => parts.split_first().map(|(p, args)| (p.as_str(), args)),
        }
    }

    /// The command as it would be typed in a shell.
    pub fn display(&self) -> String {
        match self {
            CommandSpec::Program(program) => program.clone(),
            CommandSpec::WithArgs(parts) => parts.join(" "),
        }
    }
}

impl From<&str> for CommandSpec {
    fn from(program: &str) -> Self {
        CommandSpec::Program(program.to_string())
    }
}

/// Executable names and install locations across platforms, in the order
/// they are tried.
pub fn default_commands() -> Vec<CommandSpec> {
    [
        "freecadcmd",
        "FreeCADCmd",
        "/Applications/FreeCAD.app/Contents/MacOS/FreeCAD",
        "freecad",
        r"C:\Program Files\FreeCAD\bin\FreeCADCmd.exe",
    ]
    .into_iter()
    .map(CommandSpec::from)
    .collect()
}

const SCRIPT_TEMPLATE: &str = r#"import sys

INPUT = @INPUT@
OUTPUT = @OUTPUT@

try:
    import FreeCAD
    import Import
    import Mesh

    doc = FreeCAD.newDocument("PartscopeConvert")
    Import.insert(INPUT, doc.Name)
    Mesh.export(list(doc.Objects), OUTPUT)
    FreeCAD.closeDocument(doc.Name)
except Exception as exc:
    print("Error: {}".format(exc))
    sys.exit(1)

sys.exit(0)
"#;

/// Drives FreeCAD with a generated Python script.
///
/// The script lives in a temp file next to the output and is removed when
/// the attempt ends, whatever the outcome.
#[derive(Debug, Clone)]
pub struct FreeCadCliConverter {
    commands: Vec<CommandSpec>,
    timeout: Duration,
}

impl Default for FreeCadCliConverter {
    fn default() -> Self {
        Self::new(default_commands(), Duration::from_secs(180))
    }
}

impl FreeCadCliConverter {
    /// Try `commands` in order, each bounded by `timeout`.
    pub fn new(commands: Vec<CommandSpec>, timeout: Duration) -> Self {
        Self { commands, timeout }
    }

    /// The Python conversion script for one input/output pair.
    pub fn script(input: &Path, output: &Path) -> String {
        SCRIPT_TEMPLATE
            .replace("@INPUT@", &python_literal(input))
            .replace("@OUTPUT@", &python_literal(output))
    }

    fn write_script(&self, input: &Path, output: &Path) -> io::Result<tempfile::NamedTempFile> {
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut file = tempfile::Builder::new()
            .prefix("freecad_convert_")
            .suffix(".py")
            .tempfile_in(dir)?;
        let script = Self::script(&std::path::absolute(input)?, &std::path::absolute(output)?);
        file.write_all(script.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

/// JSON string literals are valid Python string literals.
fn python_literal(path: &Path) -> String {
    serde_json::Value::String(path.to_string_lossy().into_owned()).to_string()
}

impl ExchangeConverter for FreeCadCliConverter {
    fn name(&self) -> &str {
        "FreeCAD"
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), StrategyFailure> {
        let script = self
            .write_script(input, output)
            .map_err(|e| StrategyFailure::fault(format!("cannot write conversion script: {e}")))?;

        let mut attempts: Vec<String> = Vec::new();
        for spec in &self.commands {
            let Some((program, args)) = spec.parts() else {
                continue;
            };
            let mut command = Command::new(program);
            command.args(args).arg(script.path());
            debug!(command = %spec.display(), "trying FreeCAD");

            // Only the command that exits cleanly may leave an output behind.
            clear_output(output);
            match run_with_timeout(&mut command, self.timeout) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(command = %spec.display(), "not found");
                }
                Err(e) => attempts.push(format!("{}: {e}", spec.display())),
                Ok(finished) => match finished.status {
                    None => attempts.push(format!(
                        "{}: timed out after {}s",
                        spec.display(),
                        self.timeout.as_secs_f64()
                    )),
                    Some(status) if status.success() => match verify_output(output) {
                        Ok(()) => return Ok(()),
                        Err(_) => attempts.push(format!(
                            "{}: exited successfully but wrote no output",
                            spec.display()
                        )),
                    },
                    Some(status) => {
                        let detail = finished
                            .last_line()
                            .map(|l| format!(" ({l})"))
                            .unwrap_or_default();
                        attempts.push(format!("{}: {status}{detail}", spec.display()));
                    }
                },
            }
            clear_output(output);
        }

        if attempts.is_empty() {
            let tried: Vec<String> = self.commands.iter().map(CommandSpec::display).collect();
            return Err(StrategyFailure::ToolUnavailable(format!(
                "no FreeCAD executable found (tried {})",
                tried.join(", ")
            )));
        }
        Err(StrategyFailure::ConversionFault(attempts.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn script_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|e| e == "py"))
            .collect()
    }

    #[test]
    fn test_script_quotes_paths() {
        let script = FreeCadCliConverter::script(
            Path::new(r"C:\Parts\a.step"),
            Path::new("/tmp/out \"x\".stl"),
        );
        assert!(script.contains(r#"INPUT = "C:\\Parts\\a.step""#));
        assert!(script.contains(r#"OUTPUT = "/tmp/out \"x\".stl""#));
        assert!(script.contains("Import.insert(INPUT, doc.Name)"));
        assert!(script.contains("Mesh.export(list(doc.Objects), OUTPUT)"));
    }

    #[test]
    fn test_default_commands_order() {
        let commands = default_commands();
        assert_eq!(commands[0], CommandSpec::from("freecadcmd"));
        assert_eq!(commands.len(), 5);
    }

    #[test]
    fn test_no_executable_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("part.step");
        std::fs::write(&input, "ISO-10303-21;").unwrap();
        let converter = FreeCadCliConverter::new(
            vec!["/nonexistent/freecadcmd".into(), "partscope-no-such-freecad".into()],
            Duration::from_secs(1),
        );

        let err = converter.convert(&input, &dir.path().join("model.stl")).unwrap_err();
        assert!(matches!(err, StrategyFailure::ToolUnavailable(_)), "{err}");
        assert!(script_files(dir.path()).is_empty());
    }

    #[test]
    fn test_command_spec_accepts_string_or_array() {
        let commands: Vec<CommandSpec> =
            serde_json::from_str(r#"["freecadcmd", ["flatpak", "run", "org.freecad.FreeCAD"]]"#).unwrap();
        assert_eq!(commands[0], CommandSpec::Program("freecadcmd".into()));
        let (program, args) = commands[1].parts().unwrap();
        assert_eq!(program, "flatpak");
        assert_eq!(args.len(), 2);
    }

    #[cfg(unix)]
    mod fake_freecad {
        use super::*;

        fn fake(dir: &Path, body: &str) -> CommandSpec {
            fake_named(dir, "fake_freecad.sh", body)
        }

        fn fake_named(dir: &Path, name: &str, body: &str) -> CommandSpec {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            CommandSpec::WithArgs(vec!["sh".into(), path.display().to_string()])
        }

        fn setup() -> (TempDir, PathBuf, PathBuf) {
            let dir = TempDir::new().unwrap();
            let input = dir.path().join("part.step");
            std::fs::write(&input, "ISO-10303-21;").unwrap();
            let output = dir.path().join("model.stl");
            (dir, input, output)
        }

        #[test]
        fn test_success_requires_output() {
            let (dir, input, output) = setup();
            let converter = FreeCadCliConverter::new(vec![fake(dir.path(), "exit 0")], Duration::from_secs(10));
            let err = converter.convert(&input, &output).unwrap_err();
            assert!(err.to_string().contains("wrote no output"), "{err}");
            assert!(script_files(dir.path()).is_empty());
        }

        #[test]
        fn test_writes_output_from_script() {
            let (dir, input, output) = setup();
            let body = r#"out=$(sed -n 's/^OUTPUT = "\(.*\)"$/\1/p' "$1")
printf 'solid fake\n' > "$out""#;
            let converter = FreeCadCliConverter::new(vec![fake(dir.path(), body)], Duration::from_secs(10));
            converter.convert(&input, &output).unwrap();
            assert!(std::fs::metadata(&output).unwrap().len() > 0);
            assert!(script_files(dir.path()).is_empty());
        }

        #[test]
        fn test_nonzero_exit_reports_last_line() {
            let (dir, input, output) = setup();
            let converter = FreeCadCliConverter::new(
                vec![fake(dir.path(), "echo 'Error: bad STEP'; exit 1")],
                Duration::from_secs(10),
            );
            let err = converter.convert(&input, &output).unwrap_err();
            assert!(matches!(err, StrategyFailure::ConversionFault(_)));
            assert!(err.to_string().contains("Error: bad STEP"), "{err}");
        }

        #[test]
        fn test_partial_output_from_failed_command_is_discarded() {
            let (dir, input, output) = setup();
            let crashes = r#"out=$(sed -n 's/^OUTPUT = "\(.*\)"$/\1/p' "$1")
printf 'solid trunc' > "$out"
exit 1"#;
            let converter = FreeCadCliConverter::new(
                vec![
                    fake_named(dir.path(), "crashes.sh", crashes),
                    fake_named(dir.path(), "writes_nothing.sh", "exit 0"),
                ],
                Duration::from_secs(10),
            );

            let err = converter.convert(&input, &output).unwrap_err();
            assert!(matches!(err, StrategyFailure::ConversionFault(_)), "{err}");
            assert!(err.to_string().contains("wrote no output"), "{err}");
            assert!(!output.exists());
        }

        #[test]
        fn test_timed_out_partial_output_is_discarded() {
            let (dir, input, output) = setup();
            let stalls = r#"out=$(sed -n 's/^OUTPUT = "\(.*\)"$/\1/p' "$1")
printf 'solid trunc' > "$out"
sleep 5"#;
            let converter = FreeCadCliConverter::new(
                vec![fake_named(dir.path(), "stalls.sh", stalls)],
                Duration::from_millis(500),
            );

            let err = converter.convert(&input, &output).unwrap_err();
            assert!(err.to_string().contains("timed out"), "{err}");
            assert!(!output.exists());
        }

        #[test]
        fn test_timeout_moves_to_next_command() {
            let (dir, input, output) = setup();
            let converter = FreeCadCliConverter::new(
                vec![fake(dir.path(), "sleep 5"), "/nonexistent/freecadcmd".into()],
                Duration::from_millis(200),
            );
            let err = converter.convert(&input, &output).unwrap_err();
            assert!(err.to_string().contains("timed out"), "{err}");
            assert!(script_files(dir.path()).is_empty());
        }
    }
}
