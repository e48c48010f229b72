// Configuration loading tests: files on disk, env substitution, validation.

use std::io::Write;

use gitfolio::config::Config;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_config_from_file() {
    let file = write_config(
        r#"
server:
  address: "0.0.0.0"
  port: 3000
github:
  username: "octocat"
  api_base: "https://api.github.com"
cache:
  repository_ttl_seconds: 1800
  client_ttl_seconds: 600
  debounce_ms: 250
"#,
    );

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.server.address, "0.0.0.0");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.github.username, "octocat");
    assert_eq!(config.cache.repository_ttl_seconds, 1800);
    assert_eq!(config.cache.client_ttl_seconds, 600);
    assert_eq!(config.cache.debounce_ms, 250);
}

#[test]
fn test_minimal_file_falls_back_to_defaults() {
    let file = write_config("server:\n  port: 9090\n");

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.github.username, "dacrab");
    assert_eq!(config.github.token, None);
    assert_eq!(config.cache.repository_ttl_seconds, 3600);
}

#[test]
fn test_token_substituted_from_environment() {
    std::env::set_var("GITFOLIO_FILE_TEST_TOKEN", "ghp_testvalue");
    let file = write_config("github:\n  token: \"${GITFOLIO_FILE_TEST_TOKEN}\"\n");

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.github.token.as_deref(), Some("ghp_testvalue"));
    std::env::remove_var("GITFOLIO_FILE_TEST_TOKEN");
}

#[test]
fn test_missing_env_var_fails_load() {
    let file = write_config("github:\n  token: \"${GITFOLIO_FILE_TEST_UNSET}\"\n");

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("GITFOLIO_FILE_TEST_UNSET"));
}

#[test]
fn test_missing_file_is_an_error() {
    let result = Config::from_file("/nonexistent/gitfolio.yaml");
    assert!(result.is_err());
}

#[test]
fn test_invalid_yaml_is_an_error() {
    let file = write_config("server: [not, a, mapping\n");
    assert!(Config::from_file(file.path()).is_err());
}
