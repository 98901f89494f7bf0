// tests/engine_process.rs
//
// Runs real engine scripts written into temporary directories.

mod common;

use std::sync::Arc;

use common::*;
use storyjobs::config::ConfigSnapshot;
use storyjobs::engine::{JobRegistry, RegistryOptions};
use storyjobs::errors::JobError;
use storyjobs::exec::{CommandBuilder, run_command};
use storyjobs::fs::RealFileSystem;
use storyjobs::job::{Job, JobKind, JobStatus};
use tempfile::tempdir;

fn real_registry(config: StaticConfig) -> JobRegistry {
    JobRegistry::start(
        RegistryOptions::default(),
        Arc::new(config),
        Arc::new(RealFileSystem),
    )
}

#[tokio::test]
async fn script_printing_ok_succeeds() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let script = write_engine_script(dir.path(), "printf OK");
    let registry = real_registry(StaticConfig::new().with_engine(script.to_string_lossy()));

    let id = registry.enqueue(JobKind::HealthCheck)?;
    with_timeout(registry.wait_idle()).await?;

    let job = registry.get(id).expect("job listed");
    assert_eq!(job.status(), JobStatus::Succeeded);
    assert_eq!(job.log(), "OK");

    registry.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn script_exiting_two_fails_with_stderr() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let script = write_engine_script(dir.path(), "echo boom >&2\nexit 2");
    let registry = real_registry(StaticConfig::new().with_engine(script.to_string_lossy()));

    let id = registry.enqueue(JobKind::HealthCheck)?;
    with_timeout(registry.wait_idle()).await?;

    let job = registry.get(id).expect("job listed");
    assert_eq!(job.status(), JobStatus::Failed);
    assert!(job.log().contains('2'));
    assert!(job.log().contains("boom"));

    registry.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn stderr_is_the_log_when_stdout_is_empty() -> TestResult {
    let dir = tempdir()?;
    let script = write_engine_script(dir.path(), "echo 'all good' >&2");
    let registry = real_registry(StaticConfig::new().with_engine(script.to_string_lossy()));

    let id = registry.enqueue(JobKind::HealthCheck)?;
    with_timeout(registry.wait_idle()).await?;

    let job = registry.get(id).expect("job listed");
    assert_eq!(job.status(), JobStatus::Succeeded);
    assert_eq!(job.log().trim(), "all good");

    registry.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn engine_sees_root_cwd_and_environment() -> TestResult {
    let dir = tempdir()?;
    let script = write_engine_script(
        dir.path(),
        "pwd\necho \"$1\"\necho \"$OPENAI_API_KEY\"\necho \"$PYTHONPATH\"",
    );
    let root = dir.path().canonicalize()?;

    let builder = CommandBuilder::new(Arc::new(RealFileSystem));
    let snapshot = ConfigSnapshot {
        engine_path: Some(script),
        output_directory: None,
        api_key: Some("sk-from-store".to_string()),
    };
    let command = builder.build(&Job::new(JobKind::HealthCheck), &snapshot)?;
    let output = run_command(&command).await?;

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], root.to_string_lossy());
    assert_eq!(lines[1], "doctor");
    assert_eq!(lines[2], "sk-from-store");
    assert!(lines[3].split(':').any(|p| p == root.to_string_lossy()));
    Ok(())
}

#[tokio::test]
async fn missing_execute_bit_is_repaired() -> TestResult {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir()?;
    let script = write_engine_script(dir.path(), "printf fixed");
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644))?;

    let registry = real_registry(StaticConfig::new().with_engine(script.to_string_lossy()));
    let id = registry.enqueue(JobKind::HealthCheck)?;
    with_timeout(registry.wait_idle()).await?;

    let job = registry.get(id).expect("job listed");
    assert_eq!(job.status(), JobStatus::Succeeded);
    assert_eq!(job.log(), "fixed");

    registry.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn nonexistent_engine_is_not_found() -> TestResult {
    let dir = tempdir()?;
    let missing = dir.path().join("scripts").join("run_engine.sh");

    let builder = CommandBuilder::new(Arc::new(RealFileSystem));
    let snapshot = ConfigSnapshot {
        engine_path: Some(missing.clone()),
        ..ConfigSnapshot::default()
    };

    match builder.build(&Job::new(JobKind::HealthCheck), &snapshot) {
        Err(JobError::ExecutableNotFound(path)) => assert_eq!(path, missing),
        other => panic!("expected ExecutableNotFound, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn smoke_creates_output_directory() -> TestResult {
    let dir = tempdir()?;
    let script = write_engine_script(dir.path(), "echo \"$3\"");
    let out = dir.path().join("releases").join("today");

    let registry = real_registry(
        StaticConfig::new()
            .with_engine(script.to_string_lossy())
            .with_output_dir(out.to_string_lossy()),
    );
    let id = registry.enqueue(JobKind::SmokeTest)?;
    with_timeout(registry.wait_idle()).await?;

    let job = registry.get(id).expect("job listed");
    assert_eq!(job.status(), JobStatus::Succeeded);
    assert!(out.is_dir());
    assert_eq!(
        job.log().trim(),
        out.join("smoke_test.mp4").to_string_lossy()
    );

    registry.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn missing_interpreter_fails_to_launch() -> TestResult {
    use std::os::unix::fs::PermissionsExt;

    init_tracing();

    let dir = tempdir()?;
    let scripts = dir.path().join("scripts");
    std::fs::create_dir_all(&scripts)?;
    let script = scripts.join("run_engine.sh");
    std::fs::write(&script, "#!/nonexistent/interp\necho unreachable\n")?;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;

    let registry = real_registry(StaticConfig::new().with_engine(script.to_string_lossy()));
    let id = registry.enqueue(JobKind::HealthCheck)?;
    with_timeout(registry.wait_idle()).await?;

    let job = registry.get(id).expect("job listed");
    assert_eq!(job.status(), JobStatus::Failed);
    assert!(job.log().contains("failed to launch"), "log: {}", job.log());
    assert!(!job.log().contains("unreachable"));

    registry.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn killed_engine_reports_code_minus_one() -> TestResult {
    let dir = tempdir()?;
    let script = write_engine_script(dir.path(), "echo before\nkill -9 $$\necho after");

    let builder = CommandBuilder::new(Arc::new(RealFileSystem));
    let snapshot = ConfigSnapshot {
        engine_path: Some(script.clone()),
        ..ConfigSnapshot::default()
    };
    let command = builder.build(&Job::new(JobKind::HealthCheck), &snapshot)?;
    match run_command(&command).await {
        Err(JobError::ProcessFailed { exit_code, output }) => {
            assert_eq!(exit_code, -1);
            assert!(output.contains("before"));
            assert!(!output.contains("after"));
        }
        other => panic!("expected ProcessFailed, got {other:?}"),
    }

    let registry = real_registry(StaticConfig::new().with_engine(script.to_string_lossy()));
    let id = registry.enqueue(JobKind::HealthCheck)?;
    with_timeout(registry.wait_idle()).await?;

    let job = registry.get(id).expect("job listed");
    assert_eq!(job.status(), JobStatus::Failed);
    assert!(job.log().contains("code -1"), "log: {}", job.log());

    registry.shutdown().await?;
    Ok(())
}
