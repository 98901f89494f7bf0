#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use storyjobs::config::ConfigProvider;
use storyjobs::engine::{JobRegistry, RegistryOptions};
use storyjobs::exec::{CommandBuilder, ExecutorBackend};
use storyjobs::fs::mock::MockFileSystem;

pub use storyjobs_test_utils::builders::StaticConfig;
pub use storyjobs_test_utils::fake_executor::FakeExecutor;
pub use storyjobs_test_utils::{init_tracing, with_timeout, write_engine_script};

/// Engine script path used with the mock filesystem.
pub const ENGINE: &str = "/opt/appstories/scripts/run_engine.sh";
pub const ENGINE_ROOT: &str = "/opt/appstories";
pub const OUTPUT_DIR: &str = "/srv/releases";

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Mock filesystem with an executable engine script at [`ENGINE`].
pub fn engine_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_executable(ENGINE, "#!/bin/sh\n");
    fs
}

/// Registry over the mock filesystem with an empty inherited environment.
pub fn fake_registry<E: ExecutorBackend>(
    max_concurrent_jobs: usize,
    config: StaticConfig,
    executor: E,
) -> JobRegistry {
    let builder = CommandBuilder::new(Arc::new(engine_fs())).with_base_env(BTreeMap::new());
    let config: Arc<dyn ConfigProvider> = Arc::new(config);
    JobRegistry::with_backend(
        RegistryOptions {
            max_concurrent_jobs,
        },
        config,
        builder,
        executor,
    )
}

pub fn configured() -> StaticConfig {
    StaticConfig::new()
        .with_engine(ENGINE)
        .with_output_dir(OUTPUT_DIR)
}
