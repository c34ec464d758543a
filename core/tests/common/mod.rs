use jsonata_sandbox_core::api::{Engine, EngineOptions, EngineSource};

pub const FIXTURE_ENGINE: &str = include_str!("../fixtures/jsonata-lite.js");

/// An engine running the fixture JSONata implementation.
#[allow(dead_code)]
pub fn engine() -> Engine {
    let options =
        EngineOptions::default().with_source(EngineSource::Inline(FIXTURE_ENGINE.to_string()));
    Engine::new(options).expect("fixture engine should bootstrap")
}

/// An engine running the JSONata bundle embedded at build time.
#[allow(dead_code)]
pub fn bundled_engine() -> Engine {
    Engine::new(EngineOptions::default()).expect("bundled engine should bootstrap")
}
