//! Cooperative preemption for evaluations.
//!
//! QuickJS cannot be interrupted from outside. Two mechanisms bound a call
//! instead:
//!
//! - **Deadlines** use the runtime's interrupt handler, which QuickJS polls
//!   every 10,000 interpreter operations. Once the armed deadline has passed,
//!   the handler answers `true` and QuickJS raises an uncatchable exception:
//!   `try`/`catch` in sandboxed code cannot swallow it.
//! - **Depth caps** use JSONata's `__evaluate_entry`/`__evaluate_exit` hooks,
//!   which the engine looks up in the evaluation frame on every node. The hooks
//!   throw a regular JSONata error object (code `U1001`) past the cap.
//!
//! Each limit has exactly one enforcer. The depth hooks never look at the
//! clock.

use rquickjs::{Ctx, Function, Object, Value};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Hidden global holding the compiled depth-hook factory.
pub(crate) const DEPTH_HOOKS_GLOBAL: &str = "__sandbox_depth_hooks";

pub(crate) const ENTRY_HOOK: &str = "__evaluate_entry";
pub(crate) const EXIT_HOOK: &str = "__evaluate_exit";

/// Called with `(maxDepth, message)`; returns fresh `{entry, exit}` hooks
/// sharing one counter.
pub(crate) const DEPTH_HOOKS_SOURCE: &str = r#"(function (maxDepth, message) {
    var depth = 0;
    function check() {
        if (depth > maxDepth) {
            throw { code: "U1001", message: message, stack: (new Error()).stack };
        }
    }
    return {
        entry: function (expr, input, environment) {
            if (environment && environment.isParallelCall) { return; }
            depth++;
            check();
        },
        exit: function (expr, input, environment, result) {
            if (environment && environment.isParallelCall) { return; }
            depth--;
            check();
        }
    };
})"#;

/// Adds fresh depth hooks capped at `max_depth` to an evaluation frame.
///
/// The factory must already be reachable from `ctx`'s globals.
pub(crate) fn install_depth_hooks<'js>(
    ctx: &Ctx<'js>,
    frame: &Object<'js>,
    max_depth: usize,
    message: &str,
) -> rquickjs::Result<()> {
    let factory: Function = ctx.globals().get(DEPTH_HOOKS_GLOBAL)?;
    let hooks: Object = factory.call((max_depth, message))?;
    frame.set(ENTRY_HOOK, hooks.get::<_, Value>("entry")?)?;
    frame.set(EXIT_HOOK, hooks.get::<_, Value>("exit")?)?;
    Ok(())
}

#[derive(Debug)]
struct Armed {
    started: Instant,
    deadline: Duration,
    tripped: bool,
}

/// Deadline state shared between an engine and its interrupt handler.
///
/// At most one call is armed at a time; the engine serializes calls.
#[derive(Debug, Default)]
pub(crate) struct GuardSlot {
    armed: Mutex<Option<Armed>>,
}

impl GuardSlot {
    /// Arms `deadline` until the returned scope is dropped. `None` arms nothing.
    pub(crate) fn arm(self: &Arc<Self>, deadline: Option<Duration>) -> GuardScope {
        if let Some(deadline) = deadline {
            *self.lock() = Some(Armed {
                started: Instant::now(),
                deadline,
                tripped: false,
            });
        }
        GuardScope {
            slot: Arc::clone(self),
            armed: deadline.is_some(),
        }
    }

    /// Interrupt handler body. Returns `true` to abort the running script.
    pub(crate) fn should_interrupt(&self) -> bool {
        let mut armed = self.lock();
        match armed.as_mut() {
            Some(state) => {
                if !state.tripped && state.started.elapsed() >= state.deadline {
                    state.tripped = true;
                    tracing::warn!(deadline = ?state.deadline, "Deadline exceeded, interrupting evaluation");
                }
                state.tripped
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Armed>> {
        // The state is plain data and reset on every arm.
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a deadline armed for one top-level call.
#[derive(Debug)]
pub(crate) struct GuardScope {
    slot: Arc<GuardSlot>,
    armed: bool,
}

impl GuardScope {
    /// Whether the interrupt handler aborted this call.
    pub(crate) fn tripped(&self) -> bool {
        self.armed && self.slot.lock().as_ref().is_some_and(|state| state.tripped)
    }
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        if self.armed {
            *self.slot.lock() = None;
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;
