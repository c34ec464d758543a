//! Configuration options for engines and evaluations.

use super::{Error, SharedNamespace};
use crate::codec::{JsonCodec, SerdeJsonCodec};
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable overriding the location of the bundled engine source.
pub const ENGINE_PATH_ENV: &str = "JSONATA_SANDBOX_ENGINE";

/// Whether this build embeds a JSONata bundle.
///
/// The bundle is `resources/jsonata.min.js` (or the file named by
/// `JSONATA_SANDBOX_BUNDLE_FILE`) at build time, embedded into the binary.
pub const BUNDLED_ENGINE_AVAILABLE: bool = BUNDLED_SOURCE.is_some();

#[cfg(bundled_engine)]
const BUNDLED_SOURCE: Option<&str> =
    Some(include_str!(concat!(env!("OUT_DIR"), "/jsonata.min.js")));
#[cfg(not(bundled_engine))]
const BUNDLED_SOURCE: Option<&str> = None;

/// Where the JSONata engine source comes from.
#[derive(Debug, Clone, Default)]
pub enum EngineSource {
    /// `$JSONATA_SANDBOX_ENGINE` if set, else the bundle embedded at build
    /// time (see [`BUNDLED_ENGINE_AVAILABLE`]).
    #[default]
    Bundled,
    /// A JavaScript file on disk.
    File(PathBuf),
    /// Source text supplied directly.
    Inline(String),
}

impl EngineSource {
    pub(crate) fn load(&self) -> Result<Cow<'_, str>, Error> {
        match self {
            EngineSource::Bundled => {
                load_bundled(std::env::var_os(ENGINE_PATH_ENV).map(PathBuf::from), BUNDLED_SOURCE)
            }
            EngineSource::File(path) => read_source(path.clone()).map(Cow::Owned),
            EngineSource::Inline(text) => Ok(Cow::Borrowed(text)),
        }
    }
}

fn load_bundled(
    override_path: Option<PathBuf>,
    embedded: Option<&'static str>,
) -> Result<Cow<'static, str>, Error> {
    if let Some(path) = override_path {
        return read_source(path).map(Cow::Owned);
    }
    embedded.map(Cow::Borrowed).ok_or_else(|| Error::EngineLoad {
        message: format!(
            "no JSONata bundle was embedded at build time; place jsonata.min.js in \
             core/resources and rebuild, or set {ENGINE_PATH_ENV}"
        ),
        source: None,
    })
}

fn read_source(path: PathBuf) -> Result<String, Error> {
    tracing::debug!(path = %path.display(), "Reading engine source");
    std::fs::read_to_string(&path).map_err(|err| Error::EngineLoad {
        message: format!("cannot read {}: {}", path.display(), err),
        source: Some(err),
    })
}

/// Configuration for [`Engine`](super::Engine) construction.
///
/// # Example
///
/// ```
/// use jsonata_sandbox_core::api::{EngineOptions, EngineSource};
///
/// let options = EngineOptions::default()
///     .with_source(EngineSource::File("vendor/jsonata.js".into()))
///     .with_max_stack_size(512 * 1024);
/// assert_eq!(options.max_stack_size, 512 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub source: EngineSource,

    /// Codec for numbers and containers crossing the boundary.
    pub codec: Arc<dyn JsonCodec>,

    /// Native stack budget of the runtime, in bytes.
    ///
    /// Exhausting it surfaces as a recursion overflow. Must stay well below
    /// the stack of any thread that evaluates expressions.
    ///
    /// Default: 1 MiB
    pub max_stack_size: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            source: EngineSource::default(),
            codec: Arc::new(SerdeJsonCodec),
            max_stack_size: 1024 * 1024,
        }
    }
}

impl EngineOptions {
    pub fn with_source(mut self, source: EngineSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn JsonCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_max_stack_size(mut self, max_stack_size: usize) -> Self {
        self.max_stack_size = max_stack_size;
        self
    }
}

/// Options fixed when an expression is parsed.
///
/// Limits set here become the expression's defaults and can be overridden per
/// call with [`EvaluationOptionsOverride`].
///
/// Without a namespace each expression gets a private one. Private namespaces
/// isolate globals but not execution: all expressions of one
/// [`Engine`](super::Engine) run one at a time. Parallel evaluation needs
/// several engines.
///
/// # Example
///
/// ```
/// use jsonata_sandbox_core::api::EvaluationOptions;
/// use std::time::Duration;
///
/// let options = EvaluationOptions::default()
///     .with_deadline(Duration::from_millis(500))?
///     .with_max_depth(100)?;
/// assert_eq!(options.max_depth(), Some(100));
///
/// assert!(EvaluationOptions::default().with_max_depth(0).is_err());
/// # Ok::<(), jsonata_sandbox_core::api::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EvaluationOptions {
    limits: Limits,
    namespace: Option<SharedNamespace>,
}

impl EvaluationOptions {
    /// Wall-clock budget of each evaluation. Must be positive.
    pub fn with_deadline(mut self, deadline: Duration) -> Result<Self, Error> {
        self.limits.deadline = Some(check_deadline(deadline)?);
        Ok(self)
    }

    /// Maximum JSONata evaluation depth. Must be positive.
    pub fn with_max_depth(mut self, max_depth: usize) -> Result<Self, Error> {
        self.limits.max_depth = Some(check_max_depth(max_depth)?);
        Ok(self)
    }

    /// Compiles into `namespace` instead of a private one.
    pub fn with_namespace(mut self, namespace: SharedNamespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.limits.deadline
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.limits.max_depth
    }

    pub fn namespace(&self) -> Option<&SharedNamespace> {
        self.namespace.as_ref()
    }

    pub(crate) fn limits(&self) -> Limits {
        self.limits
    }
}

/// Per-call overrides for [`EvaluationOptions`] limits.
///
/// Fields left `None` keep the expression's defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationOptionsOverride {
    pub deadline: Option<Duration>,
    pub max_depth: Option<usize>,
}

/// The limits in effect for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Limits {
    pub deadline: Option<Duration>,
    pub max_depth: Option<usize>,
}

impl Limits {
    pub(crate) fn override_with(mut self, other: &EvaluationOptionsOverride) -> Result<Self, Error> {
        if let Some(deadline) = other.deadline {
            self.deadline = Some(check_deadline(deadline)?);
        }
        if let Some(max_depth) = other.max_depth {
            self.max_depth = Some(check_max_depth(max_depth)?);
        }
        Ok(self)
    }
}

fn check_deadline(deadline: Duration) -> Result<Duration, Error> {
    if deadline.is_zero() {
        return Err(Error::Api("deadline must be greater than zero".to_string()));
    }
    Ok(deadline)
}

fn check_max_depth(max_depth: usize) -> Result<usize, Error> {
    if max_depth == 0 {
        return Err(Error::Api("max depth must be greater than zero".to_string()));
    }
    Ok(max_depth)
}

#[cfg(test)]
#[path = "options_test.rs"]
mod options_test;
