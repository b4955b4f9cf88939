//! Render trace types for debugging path assembly.
//!
//! A [`RenderTrace`] carries the same result as
//! [`ResourceHandler::render_path`](crate::ResourceHandler::render_path) plus one
//! [`LevelStep`] per level, so a caller can see which levels were set, which are
//! missing, and which values were rejected.
//!
//! # Example
//!
//! ```ignore
//! let trace = handler.trace();
//! println!("Result: {:?}", trace.result);
//! for step in &trace.steps {
//!     println!("  level[{}]: {:?} {:?}", step.level, step.value, step.status);
//! }
//! ```

use crate::RouteError;
use std::fmt;

/// Outcome for one level of a rendered path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    /// A value is set and some candidate accepts it.
    Valid,
    /// No value is set.
    Missing,
    /// A value is set but no candidate accepts it.
    Invalid,
}

impl LevelStatus {
    fn symbol(self) -> &'static str {
        match self {
            Self::Valid => "ok",
            Self::Missing => "--",
            Self::Invalid => "!!",
        }
    }
}

/// One level's evaluation in a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStep {
    /// Level index (0 = resource root).
    pub level: usize,
    /// The value set at this level, if any.
    pub value: Option<String>,
    /// Components accepted at this level (literals or patterns).
    pub candidates: Vec<String>,
    /// Whether the level passed.
    pub status: LevelStatus,
}

/// Trace of a full render.
///
/// # INV: `result` == `render_path()` result
///
/// Every level from 0 to the highest set level is reported, including those
/// after the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTrace {
    /// The final result (identical to what `render_path()` returns).
    pub result: Result<String, RouteError>,
    /// One step per level, ascending.
    pub steps: Vec<LevelStep>,
}

impl RenderTrace {
    /// Returns `true` if the path rendered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.result.is_ok()
    }

    /// The lowest level that did not pass, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<&LevelStep> {
        self.steps
            .iter()
            .find(|step| step.status != LevelStatus::Valid)
    }
}

impl fmt::Display for RenderTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(
                f,
                "  [{}] level {}: {:<16} ({})",
                step.status.symbol(),
                step.level,
                step.value.as_deref().unwrap_or("-"),
                step.candidates.join(" | "),
            )?;
        }
        match &self.result {
            Ok(path) => write!(f, "=> {path}"),
            Err(err) => write!(f, "=> error: {err}"),
        }
    }
}
