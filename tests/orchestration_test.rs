//! End-to-end dispatch from locators to backends through the scheme registry.

mod helpers;

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fileprov::ProvisionError;
use fileprov::cli::{Cli, Commands};
use fileprov::config::ProvisionConfig;
use fileprov::executor::{CommandExecutor, RealCommandExecutor};
use fileprov::registry::SchemeRegistry;
use helpers::{ScriptedExecutor, utf8_tempdir};

fn registry(executor: &Arc<ScriptedExecutor>) -> SchemeRegistry {
    let config = ProvisionConfig::from_yaml("s3cmd:\n  client: /usr/local/bin/s3cmd\n").unwrap();
    SchemeRegistry::from_config(&config, Arc::clone(executor) as Arc<dyn CommandExecutor>).unwrap()
}

fn write_config(dir: &Utf8Path) -> Utf8PathBuf {
    let path = dir.join("fileprov.yml");
    fs::write(
        &path,
        format!(
            "s3cmd:\n  client: /usr/local/bin/s3cmd\n  config-file-location: {}/.s3cfg\n  verbosity: quiet\n",
            dir
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_registry_lists_builtin_schemes() {
    let executor = ScriptedExecutor::new(&[]);
    assert_eq!(registry(&executor).schemes(), vec!["icgc-get", "s3cmd"]);
}

#[test]
fn test_registry_dispatches_by_scheme() -> Result<()> {
    let executor = ScriptedExecutor::new(&[0]);
    let registry = registry(&executor);

    assert!(registry.download_from("S3CMD://bucket/key", Utf8Path::new("/tmp/key"))?);
    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].command, "/usr/local/bin/s3cmd");
    assert!(calls[0].args.contains(&"s3://bucket/key".to_string()));
    Ok(())
}

#[test]
fn test_registry_rejects_unknown_scheme() {
    let executor = ScriptedExecutor::new(&[]);
    let err = registry(&executor)
        .download_from("gs://bucket/key", Utf8Path::new("/tmp/key"))
        .unwrap_err();
    let typed = err.downcast_ref::<ProvisionError>();
    assert!(
        matches!(typed, Some(ProvisionError::Validation(msg)) if msg.contains("gs")),
        "Expected Validation variant, got: {:?}",
        typed
    );
    assert_eq!(executor.call_count(), 0);
}

#[test]
fn test_registry_rejects_unsupported_upload() {
    let executor = ScriptedExecutor::new(&[]);
    let err = registry(&executor)
        .upload_to("icgc-get://FI509397", Utf8Path::new("/tmp/file.txt"), None)
        .unwrap_err();
    let typed = err.downcast_ref::<ProvisionError>();
    assert!(
        matches!(
            typed,
            Some(ProvisionError::Unsupported { scheme, operation })
                if scheme == "icgc-get" && operation == "upload"
        ),
        "Expected Unsupported variant, got: {:?}",
        typed
    );
    assert_eq!(executor.call_count(), 0);
}

#[test]
fn test_registry_rejects_duplicate_registration() {
    let executor = ScriptedExecutor::new(&[]);
    let mut registry = registry(&executor);
    let duplicate = fileprov::provision::S3cmdProvisioner::new(
        &Default::default(),
        Arc::clone(&executor) as Arc<dyn CommandExecutor>,
    );

    let err = registry.register(Arc::new(duplicate)).unwrap_err();
    assert!(matches!(err, ProvisionError::Validation(_)));
    assert_eq!(registry.schemes(), vec!["icgc-get", "s3cmd"]);
}

#[test]
fn test_run_upload_with_config_file() -> Result<()> {
    let (_guard, dir) = utf8_tempdir();
    let config = write_config(&dir);
    let source = dir.join("result.vcf");
    fs::write(&source, "##fileformat=VCFv4.2\n")?;

    let args = Cli::parse_from([
        "fileprov",
        "upload",
        "--config",
        config.as_str(),
        "s3cmd://results/run1/result.vcf",
        source.as_str(),
    ]);
    let Commands::Upload(opts) = args.command else {
        panic!("Expected Upload command");
    };

    let executor = ScriptedExecutor::new(&[12, 0, 0]);
    assert!(fileprov::run_upload(&opts, Arc::clone(&executor) as Arc<dyn CommandExecutor>)?);
    assert_eq!(executor.subcommands(), vec!["info", "mb", "put"]);
    let cfg = format!("{}/.s3cfg", dir);
    assert!(executor.calls().iter().all(|c| c.args[1] == cfg));
    Ok(())
}

#[test]
fn test_run_download_soft_failure() -> Result<()> {
    let (_guard, dir) = utf8_tempdir();
    let config = write_config(&dir);
    let destination = dir.join("thing.txt");

    let args = Cli::parse_from([
        "fileprov",
        "download",
        "-c",
        config.as_str(),
        "s3cmd://bucket/thing.txt",
        destination.as_str(),
    ]);
    let Commands::Download(opts) = args.command else {
        panic!("Expected Download command");
    };

    let executor = ScriptedExecutor::new(&[75]);
    assert!(!fileprov::run_download(&opts, executor)?);
    Ok(())
}

#[test]
fn test_run_download_dry_run_executes_nothing() -> Result<()> {
    let (_guard, dir) = utf8_tempdir();
    let destination = dir.join("sample.bam");

    let args = Cli::parse_from([
        "fileprov",
        "download",
        "--dry-run",
        "icgc-get://FI509397",
        destination.as_str(),
    ]);
    let Commands::Download(opts) = args.command else {
        panic!("Expected Download command");
    };

    let executor: Arc<dyn CommandExecutor> = Arc::new(RealCommandExecutor { dry_run: opts.dry_run });
    assert!(fileprov::run_download(&opts, executor)?);
    assert!(!destination.exists());
    assert_eq!(fs::read_dir(&dir)?.count(), 0);
    Ok(())
}

#[test]
fn test_run_schemes_without_config() -> Result<()> {
    let args = Cli::parse_from(["fileprov", "schemes"]);
    let Commands::Schemes(opts) = args.command else {
        panic!("Expected Schemes command");
    };

    let schemes = fileprov::run_schemes(&opts, ScriptedExecutor::new(&[]))?;
    assert_eq!(schemes, vec!["icgc-get", "s3cmd"]);
    Ok(())
}

#[test]
fn test_run_download_missing_config_file() {
    let args = Cli::parse_from([
        "fileprov",
        "download",
        "--config",
        "/nonexistent/fileprov.yml",
        "s3cmd://bucket/key",
        "/tmp/key",
    ]);
    let Commands::Download(opts) = args.command else {
        panic!("Expected Download command");
    };

    let executor = ScriptedExecutor::new(&[]);
    let err = fileprov::run_download(&opts, Arc::clone(&executor) as Arc<dyn CommandExecutor>).unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/fileprov.yml"));
    assert_eq!(executor.call_count(), 0);
}
