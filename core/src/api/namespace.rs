//! Namespaces: the QuickJS contexts expressions live in.
//!
//! Every compiled expression gets a fresh context (its own global object) by
//! default, so bindings made through one expression never reach another.
//! A [`SharedNamespace`] is a context that several expressions opt into; they
//! then share JavaScript globals such as counters or preloaded libraries.

use super::Error;
use super::engine::EngineInner;
use crate::classify::{self, Fault};
use core::fmt;
use once_cell::sync::OnceCell;
use rquickjs::{Context, Ctx, Function, Object, Persistent, Value};
use std::mem::ManuallyDrop;
use std::sync::Arc;

/// Hidden global holding compiled expressions, keyed by id.
const REGISTRY_GLOBAL: &str = "__sandbox_expressions";

/// Hidden global holding the engine's `jsonata` factory.
const FACTORY_GLOBAL: &str = "__sandbox_jsonata";

pub(crate) struct Namespace {
    pub(crate) engine: Arc<EngineInner>,
    context: ManuallyDrop<Context>,
    factory: OnceCell<()>,
    depth_hooks: OnceCell<()>,
}

impl Namespace {
    pub(crate) fn new(engine: &Arc<EngineInner>) -> Result<Self, Error> {
        let context = Context::full(&engine.runtime).map_err(|err| {
            Error::Api(format!("cannot create a namespace: {err}"))
        })?;
        Ok(Self {
            engine: Arc::clone(engine),
            context: ManuallyDrop::new(context),
            factory: OnceCell::new(),
            depth_hooks: OnceCell::new(),
        })
    }

    /// Runs `f` in this namespace. The caller must hold the engine gate.
    pub(crate) fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(Ctx) -> R,
    {
        self.context.with(f)
    }

    /// Makes the engine's `jsonata` factory reachable from this namespace.
    /// The caller must hold the engine gate.
    pub(crate) fn ensure_factory(&self) -> Result<(), Error> {
        self.factory
            .get_or_try_init(|| self.import_from_base("jsonata", FACTORY_GLOBAL))
            .map(|_| ())
    }

    /// Makes the memoized depth-hook factory reachable from this namespace.
    /// The caller must hold the engine gate.
    pub(crate) fn ensure_depth_hooks(&self) -> Result<(), Error> {
        self.depth_hooks
            .get_or_try_init(|| {
                self.engine.compile_depth_hooks()?;
                self.import_from_base(crate::guard::DEPTH_HOOKS_GLOBAL, crate::guard::DEPTH_HOOKS_GLOBAL)
            })
            .map(|_| ())
    }

    fn import_from_base(&self, name: &str, alias: &str) -> Result<(), Error> {
        let codec = self.engine.codec.as_ref();
        let saved = self.engine.base.with(|ctx| {
            ctx.globals()
                .get::<_, Function>(name)
                .map(|function| Persistent::save(&ctx, function))
                .map_err(|err| Error::Api(classify::trap(&ctx, err.into(), false, codec).to_string()))
        })?;
        self.with(|ctx| {
            saved
                .restore(&ctx)
                .and_then(|function| ctx.globals().set(alias, function))
                .map_err(|err| Error::Api(classify::trap(&ctx, err.into(), false, codec).to_string()))
        })
    }

    /// Compiles `source` and stores it in the registry under `id`.
    pub(crate) fn compile<'js>(&self, ctx: &Ctx<'js>, id: u64, source: &str) -> Result<(), Fault> {
        let factory: Function = ctx.globals().get(FACTORY_GLOBAL)?;
        let expression: Object = factory.call((source,))?;
        registry(ctx)?.set(id.to_string(), expression)?;
        Ok(())
    }

    pub(crate) fn expression<'js>(&self, ctx: &Ctx<'js>, id: u64) -> Result<Object<'js>, Fault> {
        Ok(registry(ctx)?.get(id.to_string())?)
    }

    pub(crate) fn forget(&self, ctx: &Ctx<'_>, id: u64) -> rquickjs::Result<()> {
        registry(ctx)?.remove(id.to_string())
    }
}

fn registry<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<Object<'js>> {
    let globals = ctx.globals();
    let existing: Value = globals.get(REGISTRY_GLOBAL)?;
    if let Some(registry) = existing.into_object() {
        return Ok(registry);
    }
    let registry = Object::new(ctx.clone())?;
    globals.set(REGISTRY_GLOBAL, registry.clone())?;
    Ok(registry)
}

impl Drop for Namespace {
    fn drop(&mut self) {
        // QuickJS contexts must not be freed while another thread is running
        // on the same runtime.
        let _gate = self.engine.enter();
        // SAFETY: `context` is never used again after this point.
        unsafe { ManuallyDrop::drop(&mut self.context) }
    }
}

/// A namespace shared by several expressions of one engine.
///
/// Created with [`Engine::shared_namespace`](super::Engine::shared_namespace)
/// and passed to [`EvaluationOptions::with_namespace`](super::EvaluationOptions::with_namespace).
/// Evaluations are serialized per engine, so shared globals are never
/// mutated concurrently.
///
/// # Example
///
/// ```no_run
/// use jsonata_sandbox_core::api::{Bindings, Engine, EngineOptions, EvaluationOptions};
/// use jsonata_sandbox_core::value::HostValue;
///
/// let engine = Engine::new(EngineOptions::default())?;
/// let shared = engine.shared_namespace()?;
/// shared.run_script("var counter = 0;")?;
///
/// let options = EvaluationOptions::default().with_namespace(shared.clone());
/// let expr = engine.parse("$next()", &options)?;
/// expr.register_function("next", "() => ++counter", None)?;
/// assert_eq!(expr.evaluate(&HostValue::Missing, &Bindings::new())?, HostValue::from(1_i64));
/// # Ok::<(), jsonata_sandbox_core::api::Error>(())
/// ```
#[derive(Clone)]
pub struct SharedNamespace(pub(crate) Arc<Namespace>);

impl SharedNamespace {
    /// Evaluates a JavaScript script in this namespace, e.g. to define
    /// globals used by functions registered later.
    pub fn run_script(&self, source: &str) -> Result<(), Error> {
        let engine = &self.0.engine;
        let _gate = engine.enter();
        let codec = engine.codec.as_ref();
        self.0.with(|ctx| {
            ctx.eval::<Value, _>(source)
                .map(|_| ())
                .map_err(|err| Error::Evaluation(classify::trap(&ctx, err.into(), false, codec)))
        })
    }
}

impl fmt::Debug for SharedNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedNamespace")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}
