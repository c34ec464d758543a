use super::namespace::Namespace;
use super::options::Limits;
use super::{
    BindingValue, Bindings, Engine, Error, EvaluationOptions, EvaluationOptionsOverride,
    STACK_OVERFLOW_MESSAGE,
};
use crate::classify::{self, Fault};
use crate::codec::JsonCodec;
use crate::guard;
use crate::marshal;
use crate::value::HostValue;
use core::fmt;
use rquickjs::function::This;
use rquickjs::{Ctx, Function, Object, Value};
use std::sync::Arc;
use tracing::{trace, warn};

/// A compiled JSONata expression, ready to evaluate.
///
/// Obtained from [`Engine::parse`]. Variables bound with [`bind`](Self::bind)
/// and functions registered with [`register_function`](Self::register_function)
/// persist across evaluations of this expression only.
///
/// Evaluation takes the engine's lock, even for an expression in a private
/// namespace. Concurrent calls from several threads are safe but run one
/// after another; compile from several [`Engine`]s to evaluate in parallel.
pub struct CompiledExpression {
    engine: Engine,
    namespace: Arc<Namespace>,
    id: u64,
    source: String,
    options: EvaluationOptions,
}

impl CompiledExpression {
    pub(crate) fn new(
        engine: Engine,
        namespace: Arc<Namespace>,
        id: u64,
        source: String,
        options: EvaluationOptions,
    ) -> Self {
        Self {
            engine,
            namespace,
            id,
            source,
            options,
        }
    }

    /// The JSONata source this expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Binds `$name` for every later evaluation of this expression.
    ///
    /// [`BindingValue::Expression`] sources run under this expression's
    /// deadline. A source that throws fails the call and leaves the previous
    /// binding in place.
    pub fn bind(&self, name: &str, value: impl Into<BindingValue>) -> Result<(), Error> {
        let value = value.into();
        self.run(self.bind_limits(), |ctx, codec| {
            let expression = self.namespace.expression(ctx, self.id)?;
            let value = materialize(ctx, &value, codec)?;
            let assign: Function = expression.get("assign")?;
            assign.call::<_, Value>((This(expression.clone()), name, value))?;
            Ok(())
        })
    }

    /// Registers a JavaScript function as `$name`.
    ///
    /// `function_source` must evaluate to a function. `signature` uses
    /// JSONata's signature syntax (e.g. `<n-n:n>`); arguments that do not
    /// match it fail the evaluation that calls the function.
    pub fn register_function(
        &self,
        name: &str,
        function_source: &str,
        signature: Option<&str>,
    ) -> Result<(), Error> {
        self.run(self.bind_limits(), |ctx, _| {
            let expression = self.namespace.expression(ctx, self.id)?;
            let implementation: Value = ctx.eval(function_source)?;
            let register: Function = expression.get("registerFunction")?;
            register.call::<_, Value>((This(expression.clone()), name, implementation, signature))?;
            Ok(())
        })
    }

    /// Evaluates the expression against `input` with the limits it was
    /// parsed with.
    ///
    /// Returns [`HostValue::Missing`] when the expression yields no result.
    pub fn evaluate(&self, input: &HostValue, bindings: &Bindings) -> Result<HostValue, Error> {
        self.evaluate_with(EvaluationOptionsOverride::default(), input, bindings)
    }

    /// Like [`evaluate`](Self::evaluate), with limits overridden for this
    /// call only.
    pub fn evaluate_with(
        &self,
        options_override: EvaluationOptionsOverride,
        input: &HostValue,
        bindings: &Bindings,
    ) -> Result<HostValue, Error> {
        let limits = self.options.limits().override_with(&options_override)?;
        trace!(id = self.id, ?limits, bindings = bindings.len(), "Evaluating expression");

        let result = self.run(limits, |ctx, codec| {
            let expression = self.namespace.expression(ctx, self.id)?;
            let frame = Object::new(ctx.clone())?;
            for (name, value) in bindings.iter() {
                frame.set(name, materialize(ctx, value, codec)?)?;
            }
            if let Some(max_depth) = limits.max_depth {
                guard::install_depth_hooks(ctx, &frame, max_depth, STACK_OVERFLOW_MESSAGE)?;
            }
            let input = marshal::to_js(ctx, input, codec)?;

            let evaluate: Function = expression.get("evaluate")?;
            let result: Value = evaluate.call((This(expression.clone()), input, frame))?;
            let result = match result.as_promise() {
                Some(promise) => promise.finish::<Value>()?,
                None => result.clone(),
            };
            marshal::from_js(ctx, result, codec)
        });

        if let Err(err) = &result {
            trace!(id = self.id, %err, "Evaluation failed");
        }
        result
    }

    /// Binding runs under the deadline only; depth hooks are per evaluation.
    fn bind_limits(&self) -> Limits {
        Limits {
            max_depth: None,
            ..self.options.limits()
        }
    }

    /// Runs `body` in this expression's namespace with `limits` armed.
    fn run<T>(
        &self,
        limits: Limits,
        body: impl for<'js> FnOnce(&Ctx<'js>, &dyn JsonCodec) -> Result<T, Fault>,
    ) -> Result<T, Error> {
        let inner = &self.engine.inner;
        let _gate = inner.enter();
        if limits.max_depth.is_some() {
            self.namespace.ensure_depth_hooks()?;
        }
        let guard = inner.guard.arm(limits.deadline);
        let codec = inner.codec.as_ref();
        self.namespace.with(|ctx| {
            body(&ctx, codec).map_err(|fault| {
                Error::Evaluation(classify::trap(&ctx, fault, guard.tripped(), codec))
            })
        })
    }
}

fn materialize<'js>(
    ctx: &Ctx<'js>,
    value: &BindingValue,
    codec: &dyn JsonCodec,
) -> Result<Value<'js>, Fault> {
    match value {
        BindingValue::Expression(source) => Ok(ctx.eval(source.as_str())?),
        BindingValue::Value(value) => marshal::to_js(ctx, value, codec),
        BindingValue::Foreign(foreign) => Ok(foreign.build(ctx)?),
    }
}

impl Drop for CompiledExpression {
    fn drop(&mut self) {
        let _gate = self.engine.inner.enter();
        self.namespace.with(|ctx| {
            if let Err(err) = self.namespace.forget(&ctx, self.id) {
                let _ = ctx.catch();
                warn!(id = self.id, %err, "Failed to release compiled expression");
            }
        });
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExpression")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(CompiledExpression: Send, Sync);

#[cfg(test)]
#[path = "expression_test.rs"]
mod expression_test;
