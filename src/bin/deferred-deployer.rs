//! Deferred Deployer CLI
//!
//! Replays a recorded build session through the deferred install/deploy pass

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use deferred_deployer::build::{BuildSession, ExecutionEvent};
use deferred_deployer::core::ConfigLoader;
use deferred_deployer::orchestration::{ArtifactAccumulator, DeferredDeployer, SessionReport};
use deferred_deployer::plugins::{FileSystemRepository, TransportLoader};
use deferred_deployer::repository::RepositoryResolver;
use deferred_deployer::security::RepositoryCredentials;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Install and deploy every module of a build once the whole build has finished
#[derive(Parser)]
#[command(name = "deferred-deployer")]
#[command(version)]
#[command(about = "Deferred, batched install and deploy of build artifacts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a session description through the deployer
    Run {
        /// Session description (YAML)
        #[arg(value_name = "SESSION")]
        session: PathBuf,

        /// Requested goal; replaces the goals of the session file (repeatable)
        #[arg(short, long = "goal")]
        goals: Vec<String>,

        /// User property as key=value (repeatable)
        #[arg(short = 'D', value_name = "KEY=VALUE")]
        properties: Vec<String>,

        /// Treat the session as offline
        #[arg(long)]
        offline: bool,

        /// Local repository directory for installs
        #[arg(long, default_value = ".deployer/repository")]
        local_repository: PathBuf,

        /// Print the session report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve and print the deployment repository of a session
    Check {
        /// Session description (YAML)
        #[arg(value_name = "SESSION")]
        session: PathBuf,
    },
}

/// Session description on disk
#[derive(Deserialize)]
struct SessionFile {
    #[serde(flatten)]
    session: BuildSession,
    /// Events between session start and session end
    #[serde(default)]
    events: Vec<ExecutionEvent>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    match run().await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            session,
            goals,
            properties,
            offline,
            local_repository,
            json,
        } => run_command(&session, goals, properties, offline, local_repository, json).await,
        Commands::Check { session } => check_command(&session).await,
    }
}

async fn load_session(path: &Path) -> Result<SessionFile> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut file: SessionFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid session description {}", path.display()))?;

    if let Some(base) = path.parent() {
        resolve_paths(&mut file.session, base);
    }

    // Environment variables form the system layer, below the file's own entries
    let env: HashMap<String, String> = std::env::vars().collect();
    for (key, value) in ConfigLoader::env_properties(&env) {
        file.session.system_properties.entry(key).or_insert(value);
    }

    Ok(file)
}

/// Relative unit files are taken from the directory of the session file
fn resolve_paths(session: &mut BuildSession, base: &Path) {
    let rebase = |file: &mut PathBuf| {
        if file.is_relative() {
            *file = base.join(&*file);
        }
    };

    for unit in &mut session.projects {
        rebase(&mut unit.descriptor_file);
        if let Some(primary) = unit.primary_file.as_mut() {
            rebase(primary);
        }
        for attached in &mut unit.attached {
            rebase(&mut attached.file);
        }
    }
}

fn parse_property(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        // A bare `-Dkey` is a flag
        None if !raw.trim().is_empty() => Ok((raw.trim().to_string(), String::new())),
        _ => bail!("Invalid property '{}', expected KEY=VALUE", raw),
    }
}

async fn run_command(
    path: &Path,
    goals: Vec<String>,
    properties: Vec<String>,
    offline: bool,
    local_repository: PathBuf,
    json: bool,
) -> Result<i32> {
    let SessionFile {
        mut session,
        events,
    } = load_session(path).await?;

    if !goals.is_empty() {
        session.goals = goals;
    }
    for raw in &properties {
        let (key, value) = parse_property(raw)?;
        session.user_properties.insert(key, value);
    }
    session.offline |= offline;

    let accumulator = Arc::new(ArtifactAccumulator::new());
    let installer = Arc::new(
        FileSystemRepository::new(&local_repository).with_listener(accumulator.clone()),
    );
    let transports = Arc::new(TransportLoader::new(RepositoryCredentials::from_env()));
    let mut deployer = DeferredDeployer::new(installer, transports, accumulator);

    deployer
        .on_event(&mut session, &ExecutionEvent::SessionStarted)
        .await;
    for event in &events {
        deployer.on_event(&mut session, event).await;
    }
    deployer
        .on_event(&mut session, &ExecutionEvent::SessionEnded)
        .await;

    let report = deployer.report();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if session.result.has_failures() {
        for failure in session.result.failures() {
            eprintln!("  - [{}] {}", failure.code(), failure);
        }
        Ok(1)
    } else {
        Ok(0)
    }
}

async fn check_command(path: &Path) -> Result<i32> {
    println!("\n🔍 Deployment Check\n");

    let SessionFile { session, .. } = load_session(path).await?;
    let config = ConfigLoader::load(&session, true)?;

    let Some(top_level) = session.top_level_project() else {
        println!("⚠️  Session has no build units");
        return Ok(1);
    };

    let is_snapshot = top_level.is_snapshot();
    println!(
        "Top-level project: {} ({})",
        top_level.id(),
        if is_snapshot { "snapshot" } else { "release" }
    );
    println!("Build units: {}", session.projects.len());
    println!("Attempts per unit: {}", config.retry.max_attempts());

    if config.skip {
        println!("⏭️  Deployment is skipped by configuration");
    }

    match RepositoryResolver::resolve(
        is_snapshot,
        &config.overrides,
        top_level.distribution_repository.as_ref(),
    ) {
        Ok(repository) => {
            println!("✅ Repository: {} ({})", repository.id, repository.url);
            if !TransportLoader::default().supports(&repository.url) {
                println!("❌ No transport available for {}", repository.url);
                return Ok(1);
            }
            Ok(0)
        }
        Err(e) => {
            println!("❌ {}", e);
            for action in e.suggested_actions() {
                println!("  - {}", action);
            }
            Ok(1)
        }
    }
}

fn print_summary(report: &SessionReport) {
    println!("\n📊 Session {}", report.session_id);
    println!("Outcome: {:?}", report.outcome);

    if let Some(repository) = &report.repository {
        println!("Repository: {}", repository);
    }

    if !report.installed.is_empty() {
        println!("\nInstalled ({}):", report.installed.len());
        for artifact in &report.installed {
            println!("  ✅ {}", artifact);
        }
    }

    if !report.deployed.is_empty() {
        println!("\nDeployed ({}):", report.deployed.len());
        for unit in &report.deployed {
            println!("  🚀 {}", unit);
        }
    }

    if let Some(error) = &report.error {
        println!("\n❌ {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property() {
        assert_eq!(
            parse_property("retryFailedDeploymentCount=3").unwrap(),
            ("retryFailedDeploymentCount".to_string(), "3".to_string())
        );
        assert_eq!(
            parse_property("altDeploymentRepository=Repo::http://host/a=b").unwrap(),
            (
                "altDeploymentRepository".to_string(),
                "Repo::http://host/a=b".to_string()
            )
        );
        assert_eq!(
            parse_property("deployer.skip").unwrap(),
            ("deployer.skip".to_string(), String::new())
        );
        assert!(parse_property("=value").is_err());
        assert!(parse_property("").is_err());
    }

    #[test]
    fn test_session_file_with_events() {
        let yaml = r#"
goals: [deploy]
projects:
  - group_id: com.example
    artifact_id: parent
    version: 1.0-SNAPSHOT
    packaging: pom
    descriptor_file: pom.xml
events:
  - type: project
    project: com.example:parent
    outcome: failed
"#;

        let file: SessionFile = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(file.session.goals, vec!["deploy"]);
        assert_eq!(file.events.len(), 1);
        assert!(file.events[0].is_failure());
    }

    #[tokio::test]
    async fn test_session_files_are_relative_to_session() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("core/target")).unwrap();
        std::fs::write(dir.path().join("core/pom.xml"), b"<project/>").unwrap();
        std::fs::write(dir.path().join("core/target/core-1.0.jar"), b"jar").unwrap();
        std::fs::write(
            dir.path().join("session.yaml"),
            r#"
goals: [install]
projects:
  - group_id: com.example
    artifact_id: core
    version: "1.0"
    packaging: jar
    descriptor_file: core/pom.xml
    primary_file: core/target/core-1.0.jar
"#,
        )
        .unwrap();
        let session = dir.path().join("session.yaml");

        let file = load_session(&session).await.unwrap();
        assert_eq!(
            file.session.projects[0].descriptor_file,
            dir.path().join("core/pom.xml")
        );

        let local = dir.path().join("local");
        let exit_code = run_command(&session, Vec::new(), Vec::new(), false, local.clone(), true)
            .await
            .unwrap();

        assert_eq!(exit_code, 0);
        assert!(local.join("com/example/core/1.0/core-1.0.jar").is_file());
        assert!(local.join("com/example/core/1.0/core-1.0.pom").is_file());
    }
}
