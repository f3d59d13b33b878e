//! Invoking the external computation engine

use crate::bridge::{to_foreign_value, ForeignError, ForeignRuntime};
use crate::output::{FunctionHandles, Payload};
use tracing::{info, warn};

/// Message shown to the user whenever the engine reports failure.
pub const FAILURE_MESSAGE: &str = "Something went wrong. \
    Possibly an error with latex coding in labels. \
    Try to change the axis or legend labels. \
    Also check if CSV seperator and decimal signs are correct.";

/// A foreign runtime that can also run the plot/fit entry point.
pub trait ComputationEngine: ForeignRuntime {
    /// Call the entry point once. A status of `1` means success.
    fn invoke(
        &mut self,
        data: Self::Object,
        plot: Self::Object,
        functions: Self::Object,
        fit: Self::Object,
    ) -> Result<i64, ForeignError>;

    /// Drain the diagnostic text written since the last call.
    fn take_diagnostics(&mut self) -> String;
}

/// Result of one engine run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Success { diagnostics: String },
    Failure { status: i64, diagnostics: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success { .. })
    }

    pub fn diagnostics(&self) -> &str {
        match self {
            RunOutcome::Success { diagnostics } | RunOutcome::Failure { diagnostics, .. } => {
                diagnostics
            }
        }
    }

    /// The message to show the user, if any.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            RunOutcome::Success { .. } => None,
            RunOutcome::Failure { .. } => Some(FAILURE_MESSAGE),
        }
    }
}

fn function_object<E>(name: &Option<String>, engine: &mut E) -> Result<E::Object, ForeignError>
where
    E: ComputationEngine + ?Sized,
{
    match name {
        Some(name) => engine.function(name),
        None => Ok(engine.none()),
    }
}

fn function_handles<E>(handles: &FunctionHandles, engine: &mut E) -> Result<E::Object, ForeignError>
where
    E: ComputationEngine + ?Sized,
{
    match handles {
        FunctionHandles::Single(name) => function_object(name, engine),
        FunctionHandles::List(names) => {
            let mut objects = Vec::with_capacity(names.len());
            for name in names {
                objects.push(function_object(name, engine)?);
            }
            engine.list(objects)
        }
    }
}

/// Marshal the payload, invoke the engine once and collect its diagnostics.
///
/// Marshaling failures are returned as errors; a non-`1` status is a
/// [`RunOutcome::Failure`].
pub fn run<E>(engine: &mut E, payload: &Payload) -> Result<RunOutcome, ForeignError>
where
    E: ComputationEngine + ?Sized,
{
    let data = to_foreign_value(&payload.data, engine)?;
    let plot = to_foreign_value(&payload.plot, engine)?;
    let functions = function_handles(&payload.functions, engine)?;
    let fit = to_foreign_value(&payload.fit, engine)?;

    let status = engine.invoke(data, plot, functions, fit);
    let diagnostics = engine.take_diagnostics();
    let status = status?;

    info!(status, "computation engine finished");
    if status == 1 {
        Ok(RunOutcome::Success { diagnostics })
    } else {
        warn!(status, "computation engine reported failure");
        Ok(RunOutcome::Failure {
            status,
            diagnostics,
        })
    }
}
