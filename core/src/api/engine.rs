//! The sandbox engine.

use super::namespace::Namespace;
use super::{
    ClassifiedError, CompiledExpression, EngineOptions, Error, EvaluationOptions, SharedNamespace,
};
use crate::classify;
use crate::codec::JsonCodec;
use crate::guard::{DEPTH_HOOKS_GLOBAL, DEPTH_HOOKS_SOURCE, GuardSlot};
use core::fmt;
use once_cell::sync::OnceCell;
use rquickjs::{Context, Ctx, Function, Runtime, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// A loaded JSONata engine.
///
/// The engine owns one QuickJS runtime into which the JSONata source was
/// evaluated once. Expressions compiled from it share that runtime but each
/// lives in its own namespace (see [`SharedNamespace`] for the opt-in
/// alternative).
///
/// Construction is the expensive part; create one engine and share it.
/// `Engine` is cheap to clone and can be used from any thread, but calls into
/// one engine are serialized: use several engines for parallel evaluation.
///
/// # Example
///
/// ```no_run
/// use jsonata_sandbox_core::api::{Bindings, Engine, EngineOptions, EvaluationOptions};
/// use jsonata_sandbox_core::value::HostValue;
/// use serde_json::json;
/// use std::time::Duration;
///
/// let engine = Engine::new(EngineOptions::default())?;
/// let options = EvaluationOptions::default().with_deadline(Duration::from_millis(500))?;
/// let expr = engine.parse("$sum(orders.price)", &options)?;
///
/// let input = HostValue::from(json!({"orders": [{"price": 2}, {"price": 3}]}));
/// assert_eq!(expr.evaluate(&input, &Bindings::new())?, HostValue::from(json!(5)));
/// # Ok::<(), jsonata_sandbox_core::api::Error>(())
/// ```
#[derive(Clone)]
pub struct Engine {
    pub(crate) inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    /// Serializes every entry into the runtime, including context teardown.
    gate: Mutex<()>,
    pub(crate) guard: Arc<GuardSlot>,
    pub(crate) codec: Arc<dyn JsonCodec>,
    /// Context the engine source was bootstrapped into.
    pub(crate) base: Context,
    pub(crate) runtime: Runtime,
    depth_hooks: OnceCell<()>,
    next_id: AtomicU64,
}

impl Engine {
    /// Loads and bootstraps the engine source.
    ///
    /// Fails with [`Error::EngineLoad`] if the source cannot be read and with
    /// [`Error::EngineBootstrap`] if evaluating it throws or leaves no global
    /// `jsonata` function behind.
    pub fn new(options: EngineOptions) -> Result<Self, Error> {
        let source = options.source.load()?;

        let runtime = Runtime::new().map_err(bootstrap_error)?;
        runtime.set_max_stack_size(options.max_stack_size);
        let guard = Arc::new(GuardSlot::default());
        let handler = Arc::clone(&guard);
        runtime.set_interrupt_handler(Some(Box::new(move || handler.should_interrupt())));

        let base = Context::full(&runtime).map_err(bootstrap_error)?;
        let codec = options.codec;
        base.with(|ctx| bootstrap(&ctx, &source, codec.as_ref()))?;
        debug!(bytes = source.len(), "Engine bootstrapped");

        Ok(Self {
            inner: Arc::new(EngineInner {
                gate: Mutex::new(()),
                guard,
                codec,
                base,
                runtime,
                depth_hooks: OnceCell::new(),
                next_id: AtomicU64::new(0),
            }),
        })
    }

    /// Compiles a JSONata expression.
    ///
    /// The expression gets a private namespace unless `options` names a
    /// shared one. Limits in `options` become the expression's defaults.
    pub fn parse(
        &self,
        source: &str,
        options: &EvaluationOptions,
    ) -> Result<CompiledExpression, Error> {
        let namespace = match options.namespace() {
            Some(shared) if !Arc::ptr_eq(&shared.0.engine, &self.inner) => {
                return Err(Error::Api(
                    "shared namespace belongs to a different engine".to_string(),
                ));
            }
            Some(shared) => Arc::clone(&shared.0),
            None => Arc::new(Namespace::new(&self.inner)?),
        };
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        {
            let _gate = self.inner.enter();
            namespace.ensure_factory()?;
            if options.max_depth().is_some() {
                namespace.ensure_depth_hooks()?;
            }
            let guard = self.inner.guard.arm(options.deadline());
            let codec = self.inner.codec.as_ref();
            namespace.with(|ctx| {
                namespace
                    .compile(&ctx, id, source)
                    .map_err(|fault| Error::Syntax {
                        error: classify::trap(&ctx, fault, guard.tripped(), codec),
                        expression: source.to_string(),
                    })
            })?;
        }
        debug!(id, shared = options.namespace().is_some(), "Compiled expression");

        Ok(CompiledExpression::new(
            self.clone(),
            namespace,
            id,
            source.to_string(),
            options.clone(),
        ))
    }

    /// Creates a namespace that expressions can opt into sharing.
    pub fn shared_namespace(&self) -> Result<SharedNamespace, Error> {
        Ok(SharedNamespace(Arc::new(Namespace::new(&self.inner)?)))
    }
}

impl EngineInner {
    /// Locks the engine for one call into the runtime.
    pub(crate) fn enter(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Compiles the depth-hook factory into the base context, once.
    /// The caller must hold the gate.
    pub(crate) fn compile_depth_hooks(&self) -> Result<(), Error> {
        self.depth_hooks
            .get_or_try_init(|| {
                debug!("Compiling depth hooks");
                let codec = self.codec.as_ref();
                self.base.with(|ctx| {
                    ctx.eval::<Function, _>(DEPTH_HOOKS_SOURCE)
                        .and_then(|factory| ctx.globals().set(DEPTH_HOOKS_GLOBAL, factory))
                        .map_err(|err| {
                            Error::Api(classify::trap(&ctx, err.into(), false, codec).to_string())
                        })
                })
            })
            .map(|_| ())
    }

    #[cfg(test)]
    pub(crate) fn depth_hooks_compiled(&self) -> bool {
        self.depth_hooks.get().is_some()
    }
}

fn bootstrap(ctx: &Ctx<'_>, source: &str, codec: &dyn JsonCodec) -> Result<(), Error> {
    ctx.eval::<Value, _>(source)
        .map_err(|err| Error::EngineBootstrap(classify::trap(ctx, err.into(), false, codec)))?;
    let entry: Value = ctx
        .globals()
        .get("jsonata")
        .map_err(|err| Error::EngineBootstrap(classify::trap(ctx, err.into(), false, codec)))?;
    if !entry.is_function() {
        return Err(Error::EngineBootstrap(ClassifiedError::internal(
            "engine source did not define a global `jsonata` function",
        )));
    }
    Ok(())
}

fn bootstrap_error(err: rquickjs::Error) -> Error {
    Error::EngineBootstrap(ClassifiedError::internal(err.to_string()))
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("codec", &self.inner.codec)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(Engine: Send, Sync);

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
