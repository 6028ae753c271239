use super::*;
use tempfile::{tempdir, TempDir};
use std::fs::File;
use std::io::Write;

/// Helper function to create a test configuration file
fn create_test_config_file(dir: &TempDir, content: &str) -> PathBuf {
    let config_path = dir.path().join("config.toml");
    let mut file = File::create(&config_path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    config_path
}

fn empty_args() -> CliArgs {
    CliArgs {
        database_url: None,
        data_source: None,
        bind_address: None,
        port: None,
        admin_username: None,
        admin_password: None,
        session_ttl_hours: None,
        log_json: false,
        debug: false,
    }
}

fn sample_config() -> Config {
    Config {
        database_url: "original.db".to_string(),
        data_source: DataSource::Sqlite,
        bind_address: "127.0.0.1".to_string(),
        port: 3000,
        admin_username: "admin".to_string(),
        admin_password: "admin".to_string(),
        session_ttl_hours: 24,
        log_json: false,
    }
}

/// Tests for Config::apply_update
#[test]
fn test_apply_update_with_all_values() {
    let update = ConfigUpdate {
        database_url: Some("updated.db".to_string()),
        data_source: Some(DataSource::Sample),
        bind_address: Some("0.0.0.0".to_string()),
        port: Some(8080),
        admin_username: Some("ops".to_string()),
        admin_password: Some("s3cret".to_string()),
        session_ttl_hours: Some(2),
        log_json: Some(true),
        server_url: None,
    };

    let updated = sample_config().apply_update(update);

    assert_eq!(updated.database_url, "updated.db");
    assert_eq!(updated.data_source, DataSource::Sample);
    assert_eq!(updated.listen_addr(), "0.0.0.0:8080");
    assert_eq!(updated.admin_username, "ops");
    assert_eq!(updated.admin_password, "s3cret");
    assert_eq!(updated.session_ttl_hours, 2);
    assert!(updated.log_json);
}


#[test]
fn test_apply_update_with_partial_values() {
    let update = ConfigUpdate {
        port: Some(9000),
        ..Default::default()
    };

    let updated = sample_config().apply_update(update);

    assert_eq!(updated.port, 9000);
    assert_eq!(updated.database_url, "original.db"); // Unchanged
    assert_eq!(updated.data_source, DataSource::Sqlite); // Unchanged
}


#[test]
fn test_apply_update_with_no_values() {
    let updated = sample_config().apply_update(ConfigUpdate::default());

    assert_eq!(updated.database_url, "original.db");
    assert_eq!(updated.port, 3000);
    assert_eq!(updated.session_ttl_hours, 24);
}


#[test]
fn test_session_ttl_conversion() {
    let config = sample_config();
    assert_eq!(config.session_ttl(), Duration::hours(24));

    let huge = Config { session_ttl_hours: u64::MAX, ..sample_config() };
    assert_eq!(huge.session_ttl(), Duration::hours(24 * 365 * 100));
}


#[test]
fn test_admin_credentials_from_config() {
    use crate::admin::CredentialVerifier;

    let config = Config { admin_password: "hunter2".to_string(), ..sample_config() };
    let verifier = config.admin_credentials();

    assert!(verifier.verify("admin", "hunter2"));
    assert!(!verifier.verify("admin", "admin"));
}


/// Tests for base_config
#[test]
fn test_base_config_defaults() {
    let config = base_config(None);

    assert_eq!(config.database_url, "evento.db");
    assert_eq!(config.data_source, DataSource::Sqlite);
    assert_eq!(config.admin_username, "admin");
    assert_eq!(config.admin_password, "admin");
    assert_eq!(config.session_ttl_hours, 24 * 7);
    assert!(!config.log_json);
}


#[test]
fn test_base_config_with_path() {
    let temp_dir = tempdir().unwrap();
    let config = base_config(Some(temp_dir.path().to_path_buf()));

    let expected_db_path = temp_dir.path().join("evento.db").to_string_lossy().to_string();
    assert_eq!(config.database_url, expected_db_path);
}


/// Tests for config_from_args
#[test]
fn test_config_from_args_with_values() {
    let args = CliArgs {
        database_url: Some("args.db".to_string()),
        data_source: Some(DataSource::Sample),
        port: Some(4000),
        log_json: true,
        ..empty_args()
    };

    let update = config_from_args(args);

    assert_eq!(update.database_url, Some("args.db".to_string()));
    assert_eq!(update.data_source, Some(DataSource::Sample));
    assert_eq!(update.port, Some(4000));
    assert_eq!(update.log_json, Some(true));
    assert_eq!(update.bind_address, None);
}


#[test]
fn test_config_from_args_with_no_values() {
    let update = config_from_args(empty_args());

    assert_eq!(update.database_url, None);
    assert_eq!(update.data_source, None);
    // An unset flag must not override a file that turned JSON logging on
    assert_eq!(update.log_json, None);
}


/// Tests for config_from_file - successful cases
#[test]
fn test_config_from_file_with_no_path() {
    let update = config_from_file(None).unwrap();

    assert_eq!(update.database_url, None);
    assert_eq!(update.data_source, None);
}


#[test]
fn test_config_from_file_with_valid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        database_url = "file.db"
        data_source = "sample"
        port = 8081
        admin_username = "boss"
        server_url = "http://localhost:8081"
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);
    let result = config_from_file(Some(config_path));

    assert!(result.is_ok(), "Failed to parse config file: {}", result.err().unwrap());
    let update = result.unwrap();
    assert_eq!(update.database_url, Some("file.db".to_string()));
    assert_eq!(update.data_source, Some(DataSource::Sample));
    assert_eq!(update.port, Some(8081));
    assert_eq!(update.admin_username, Some("boss".to_string()));
    assert_eq!(update.server_url, Some("http://localhost:8081".to_string()));
}


/// Tests for config_from_file - failure cases
#[test]
fn test_config_from_file_with_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        database_url = "file.db"
        port = "not a number"
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);

    assert!(config_from_file(Some(config_path)).is_err());
}


#[test]
fn test_config_from_file_with_unknown_data_source() {
    let temp_dir = tempdir().unwrap();
    let config_path = create_test_config_file(&temp_dir, "data_source = \"firebase\"\n");

    assert!(config_from_file(Some(config_path)).is_err());
}


#[test]
fn test_config_from_file_with_nonexistent_file() {
    let temp_dir = tempdir().unwrap();
    let nonexistent_path = temp_dir.path().join("nonexistent_config.toml");

    let update = config_from_file(Some(nonexistent_path)).unwrap();
    assert_eq!(update.database_url, None);
}


#[test]
fn test_data_source_parsing() {
    assert_eq!("sqlite".parse::<DataSource>(), Ok(DataSource::Sqlite));
    assert_eq!(" Sample ".parse::<DataSource>(), Ok(DataSource::Sample));
    assert!("supabase".parse::<DataSource>().is_err());
    assert_eq!(DataSource::Sample.to_string(), "sample");
}


/// Tests for the layering done by get_config
#[test]
fn test_get_config_precedence() {
    let args = CliArgs {
        database_url: Some("args.db".to_string()),
        ..empty_args()
    };

    let file = ConfigUpdate {
        database_url: Some("file.db".to_string()),
        data_source: Some(DataSource::Sample),
        ..Default::default()
    };

    let config = base_config(None)
        .apply_update(file)
        .apply_update(config_from_args(args));

    assert_eq!(config.database_url, "args.db");
    assert_eq!(config.data_source, DataSource::Sample);
    assert_eq!(config.port, 3000);
}
