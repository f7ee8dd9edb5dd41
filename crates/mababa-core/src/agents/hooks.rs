//! Post-invocation output hooks

use super::specialist::AgentOutput;

/// What happens to an agent's output before it reaches the report
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    /// Keep the (possibly rewritten) output
    Keep(AgentOutput),
    /// Mark the section as suppressed
    Suppress,
}

/// Hook run after each successful invocation
pub trait OutputHook: Send + Sync {
    /// Inspect or replace the output
    fn after_invocation(&self, output: AgentOutput) -> HookOutcome;
}

/// Default hook: output goes through untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl OutputHook for PassThrough {
    fn after_invocation(&self, output: AgentOutput) -> HookOutcome {
        HookOutcome::Keep(output)
    }
}

/// Opt-in hook that hides an agent's output; the report still lists the
/// section as suppressed
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressOutput;

impl OutputHook for SuppressOutput {
    fn after_invocation(&self, _output: AgentOutput) -> HookOutcome {
        HookOutcome::Suppress
    }
}
