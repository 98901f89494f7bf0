pub mod builders;
pub mod fake_executor;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Once;

use storyjobs::logging::LOG_ENV;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests, once per test binary.
///
/// Output goes through `with_test_writer()`, so the harness only shows it for
/// failing tests unless run with `-- --nocapture`. The filter comes from
/// `STORYJOBS_LOG` (e.g. `STORYJOBS_LOG=storyjobs::engine=debug`), else `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, panicking if it takes longer than five seconds.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("test timed out after 5 seconds")
}

/// Write an executable shell script at `<root>/scripts/run_engine.sh`, laid
/// out the way a real engine checkout is.
pub fn write_engine_script(root: &Path, body: &str) -> PathBuf {
    let scripts = root.join("scripts");
    fs::create_dir_all(&scripts).expect("create scripts dir");

    let path = scripts.join("run_engine.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write engine script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod engine script");
    path
}
