#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use storyjobs::config::{
    ConfigFile, ConfigProvider, CredentialsSection, EngineSection, OutputSection, RawConfigFile,
    SchedulerSection,
};
use storyjobs::types::API_KEY_NAME;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                engine: EngineSection::default(),
                output: OutputSection::default(),
                scheduler: SchedulerSection::default(),
                credentials: CredentialsSection::default(),
            },
        }
    }

    pub fn engine_path(mut self, path: &str) -> Self {
        self.config.engine.path = Some(path.to_string());
        self
    }

    pub fn output_directory(mut self, dir: &str) -> Self {
        self.config.output.directory = Some(dir.to_string());
        self
    }

    pub fn max_concurrent_jobs(mut self, n: usize) -> Self {
        self.config.scheduler.max_concurrent_jobs = n;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `ConfigProvider` whose values tests can change while a registry runs.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    inner: Arc<Mutex<Settings>>,
}

#[derive(Debug, Clone, Default)]
struct Settings {
    engine_path: Option<String>,
    output_directory: Option<String>,
    api_key: Option<String>,
}

impl StaticConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(self, path: impl Into<String>) -> Self {
        self.set_engine(Some(path.into()));
        self
    }

    pub fn with_output_dir(self, dir: impl Into<String>) -> Self {
        self.inner.lock().unwrap().output_directory = Some(dir.into());
        self
    }

    pub fn with_api_key(self, key: impl Into<String>) -> Self {
        self.inner.lock().unwrap().api_key = Some(key.into());
        self
    }

    pub fn set_engine(&self, path: Option<String>) {
        self.inner.lock().unwrap().engine_path = path;
    }
}

impl ConfigProvider for StaticConfig {
    fn engine_path(&self) -> Option<String> {
        self.inner.lock().unwrap().engine_path.clone()
    }

    fn output_directory(&self) -> Option<String> {
        self.inner.lock().unwrap().output_directory.clone()
    }

    fn credential(&self, name: &str) -> Option<String> {
        if name == API_KEY_NAME {
            self.inner.lock().unwrap().api_key.clone()
        } else {
            None
        }
    }
}
