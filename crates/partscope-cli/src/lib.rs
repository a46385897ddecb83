//! Shared pieces of the partscope binaries.

use std::io::Write;

use partscope::{AttemptFailure, Progress, Stage};

/// Install the log subscriber. `RUST_LOG` wins; otherwise `warn`, or
/// `debug` when `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Prints stage and converter progress as plain lines.
pub struct LinePrinter<W> {
    out: W,
}

impl<W: Write> LinePrinter<W> {
    /// Print to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    // Write errors are ignored.
    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        let _ = writeln!(self.out, "{text}");
    }
}

impl<W: Write> Progress for LinePrinter<W> {
    fn stage_started(&mut self, stage: Stage) {
        self.line(format_args!("Step {}/{}: {}...", stage.number(), Stage::COUNT, stage));
    }

    fn attempt_started(&mut self, method: &str) {
        self.line(format_args!("  Trying {method}..."));
    }

    fn attempt_succeeded(&mut self, method: &str) {
        self.line(format_args!("  ✓ Converted with {method}"));
    }

    fn attempt_failed(&mut self, failure: &AttemptFailure) {
        self.line(format_args!("  ✗ {failure}"));
    }
}

/// Human-readable list of suggested fixes.
pub fn remediation_text(steps: &[&str]) -> String {
    let mut text = String::from("To convert STEP files you can:\n");
    for (i, step) in steps.iter().enumerate() {
        text.push_str(&format!("  {}. {step}\n", i + 1));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use partscope::StrategyFailure;

    #[test]
    fn test_line_printer_output() {
        let mut printer = LinePrinter::new(Vec::new());
        printer.stage_started(Stage::ExchangeToMesh);
        printer.attempt_started("OpenCASCADE");
        printer.attempt_failed(&AttemptFailure {
            method: "OpenCASCADE".into(),
            failure: StrategyFailure::ToolUnavailable("built without the `occt` feature".into()),
        });
        printer.attempt_started("FreeCAD");
        printer.attempt_succeeded("FreeCAD");
        printer.stage_started(Stage::Analysis);

        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(
            text,
            "Step 1/4: Converting STEP to STL...\n\
             \x20 Trying OpenCASCADE...\n\
             \x20 ✗ OpenCASCADE: not available: built without the `occt` feature\n\
             \x20 Trying FreeCAD...\n\
             \x20 ✓ Converted with FreeCAD\n\
             Step 4/4: Extracting geometric data...\n"
        );
    }

    #[test]
    fn test_remediation_numbering() {
        let text = remediation_text(&["first", "second"]);
        assert_eq!(text, "To convert STEP files you can:\n  1. first\n  2. second\n");
    }
}
