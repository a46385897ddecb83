//! Exchange-format converters and the first-success combinator.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{AttemptFailure, ConvertError, StrategyFailure};
use crate::progress::Progress;

/// Turns a boundary-representation exchange file into an STL mesh.
pub trait ExchangeConverter {
    /// Short name shown in progress and diagnostics.
    fn name(&self) -> &str;

    /// Write an STL for `input` at `output`.
    ///
    /// Returning `Ok` is a claim, not proof: the caller still checks that
    /// `output` exists and is non-empty.
    fn convert(&self, input: &Path, output: &Path) -> Result<(), StrategyFailure>;
}

/// Outcome of running a converter chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    /// A converter produced a non-empty output file.
    Success {
        /// The verified output file.
        output: PathBuf,
        /// Name of the converter that produced it.
        method: String,
    },
    /// Every converter failed, in the order tried.
    Failure {
        /// One entry per converter.
        reasons: Vec<AttemptFailure>,
    },
}

impl ConversionResult {
    /// True for [`ConversionResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success { .. })
    }

    /// Converter name on success.
    pub fn method(&self) -> Option<&str> {
        match self {
            ConversionResult::Success { method, .. } => Some(method),
            ConversionResult::Failure { .. } => None,
        }
    }

    /// Turn a failure into [`ConvertError::PipelineExhausted`].
    pub fn into_result(self) -> crate::error::Result<(PathBuf, String)> {
        match self {
            ConversionResult::Success { output, method } => Ok((output, method)),
            ConversionResult::Failure { reasons } => {
                Err(ConvertError::PipelineExhausted { failures: reasons })
            }
        }
    }
}

/// Check that a converter left a non-empty file behind.
pub fn verify_output(path: &Path) -> Result<(), StrategyFailure> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => Err(StrategyFailure::fault("output file is empty")),
        Err(_) => Err(StrategyFailure::fault("no output file was written")),
    }
}

/// Remove a possibly partial output file. A missing file is fine.
pub(crate) fn clear_output(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "cleared stale output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not clear stale output"),
    }
}

/// Try each converter in order and stop at the first verified success.
pub fn first_success(
    converters: &[Box<dyn ExchangeConverter>],
    input: &Path,
    output: &Path,
    progress: &mut dyn Progress,
) -> ConversionResult {
    let mut reasons = Vec::with_capacity(converters.len());
    for converter in converters {
        let method = converter.name();
        progress.attempt_started(method);

        // A leftover file from an earlier attempt must not pass verification.
        clear_output(output);

        let outcome = converter
            .convert(input, output)
            .and_then(|()| verify_output(output));
        match outcome {
            Ok(()) => {
                info!(method, output = %output.display(), "exchange conversion succeeded");
                progress.attempt_succeeded(method);
                return ConversionResult::Success {
                    output: output.to_path_buf(),
                    method: method.to_string(),
                };
            }
            Err(failure) => {
                match &failure {
                    StrategyFailure::ToolUnavailable(reason) => debug!(method, %reason, "converter unavailable"),
                    StrategyFailure::ConversionFault(reason) => warn!(method, %reason, "converter failed"),
                }
                let attempt = AttemptFailure {
                    method: method.to_string(),
                    failure,
                };
                progress.attempt_failed(&attempt);
                reasons.push(attempt);
            }
        }
    }
    ConversionResult::Failure { reasons }
}
