use super::*;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("product: cms").unwrap();
    assert_eq!(config.product, "cms");
    assert!(config.target_version.is_none());
    assert!(config.database.is_memory());
    assert!(config.lock_holder.is_none());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
product: cms
target_version: "1.1.0"
database:
  path: data/cms.duckdb
lock_holder: web-01
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.target_version, Some(SchemaVersion::new(1, 1, 0)));
    assert_eq!(config.database.path, "data/cms.duckdb");
    assert_eq!(config.resolve_lock_holder(), "web-01");
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("product: cms\nproduct_name: x\n");
    assert!(result.is_err());
}

#[test]
fn test_invalid_version_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("product: cms\ntarget_version: soon\n");
    assert!(result.is_err());
}

#[test]
fn test_load_from_dir_prefers_yml() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "stepwise.yml", "product: from_yml\n");
    write_config(&dir, "stepwise.yaml", "product: from_yaml\n");
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.product, "from_yml");
}

#[test]
fn test_load_from_dir_falls_back_to_yaml() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "stepwise.yaml", "product: cms\n");
    assert_eq!(Config::load_from_dir(dir.path()).unwrap().product, "cms");
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_blank_lock_holder_invalid() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "stepwise.yml", "product: cms\nlock_holder: \"  \"\n");
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_default_lock_holder_uses_host_and_pid() {
    let pid = std::process::id();
    let holder = default_lock_holder(|key| (key == "HOSTNAME").then(|| "web-02".to_string()));
    assert_eq!(holder, format!("web-02:{pid}"));

    let holder = default_lock_holder(|key| match key {
        "HOSTNAME" => Some("  ".to_string()),
        "COMPUTERNAME" => Some("WIN-BUILD".to_string()),
        _ => None,
    });
    assert_eq!(holder, format!("WIN-BUILD:{pid}"));

    assert_eq!(default_lock_holder(|_| None), format!("stepwise:{pid}"));
}

#[test]
fn test_resolve_lock_holder_ends_with_pid() {
    let config: Config = serde_yaml::from_str("product: cms").unwrap();
    let holder = config.resolve_lock_holder();
    assert!(holder.ends_with(&format!(":{}", std::process::id())), "{holder}");
    assert!(!holder.starts_with(':'));
}

#[test]
fn test_database_path_absolute() {
    let root = Path::new("/srv/app");
    let relative = DatabaseConfig {
        path: "data/cms.duckdb".to_string(),
    };
    assert_eq!(
        relative.path_absolute(root),
        PathBuf::from("/srv/app/data/cms.duckdb")
    );
    assert_eq!(
        DatabaseConfig::default().path_absolute(root),
        PathBuf::from(":memory:")
    );
}
