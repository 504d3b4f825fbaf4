//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

fn write_temp_config(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(name);
    fs::write(&path, contents).expect("Failed to write test config");
    path
}

#[test]
fn default_config_path_contains_scrollstack_config_toml() {
    if let Some(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(
            path_str.contains("scrollstack") && path_str.ends_with("config.toml"),
            "Path should contain 'scrollstack' and end with 'config.toml', got: {}",
            path_str
        );
    }
}

#[test]
fn default_log_path_ends_with_log_file_name() {
    let path = default_log_path();
    assert!(
        path.to_string_lossy().ends_with("scrollstack.log"),
        "Default log path should end with 'scrollstack.log', got: {:?}",
        path
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let path = write_temp_config(
        "scrollstack_test_valid.toml",
        r#"
log_file_path = "/tmp/scrollstack-test.log"

[engine]
default_margins = { bottom = 10.0 }
valid_rect_buffer = 1.0
discardable_factor = 3.0
trailing_inset = 24.0
"#,
    );

    let config = load_config_file(&path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(
        config.log_file_path,
        Some(PathBuf::from("/tmp/scrollstack-test.log"))
    );
    let engine = config.engine.expect("engine section present");
    assert_eq!(engine.default_margins, Some(Insets::bottom(10.0)));
    assert_eq!(engine.default_padding, None);
    assert_eq!(engine.valid_rect_buffer, Some(1.0));
    assert_eq!(engine.discardable_factor, Some(3.0));
    assert_eq!(engine.trailing_inset, Some(24.0));

    fs::remove_file(path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let path = write_temp_config("scrollstack_test_invalid.toml", "engine = [ not toml");

    let result = load_config_file(&path);
    assert!(
        matches!(result, Err(ConfigError::ParseError { .. })),
        "Invalid TOML should be a parse error, got {:?}",
        result
    );

    fs::remove_file(path).ok();
}

#[test]
fn load_config_file_rejects_unknown_keys() {
    let path = write_temp_config(
        "scrollstack_test_unknown.toml",
        "[engine]\nbounce = true\n",
    );

    let result = load_config_file(&path);
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));

    fs::remove_file(path).ok();
}

#[test]
fn load_config_file_reports_read_error_for_directory() {
    let dir = env::temp_dir().join("scrollstack_test_config_dir.toml");
    fs::create_dir_all(&dir).expect("create dir");

    let result = load_config_file(&dir);
    assert!(
        matches!(result, Err(ConfigError::ReadError { .. })),
        "Directory should not be readable as config, got {:?}",
        result
    );

    fs::remove_dir_all(dir).ok();
}

#[test]
fn merge_config_without_file_uses_defaults() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_keeps_defaults_for_missing_fields() {
    let file = ConfigFile {
        log_file_path: None,
        engine: Some(EngineSection {
            discardable_factor: Some(4.0),
            ..EngineSection::default()
        }),
    };

    let resolved = merge_config(Some(file));

    assert_eq!(resolved.engine.discardable_factor, 4.0);
    assert_eq!(
        resolved.engine.valid_rect_buffer,
        EngineConfig::default().valid_rect_buffer
    );
    assert_eq!(resolved.log_file_path, default_log_path());
}

#[test]
fn merge_config_log_path_overrides_default() {
    let custom = PathBuf::from("/custom/path/to/app.log");
    let file = ConfigFile {
        log_file_path: Some(custom.clone()),
        engine: None,
    };

    assert_eq!(merge_config(Some(file)).log_file_path, custom);
}

#[test]
fn cli_overrides_win_over_file() {
    let file = ConfigFile {
        log_file_path: None,
        engine: Some(EngineSection {
            discardable_factor: Some(4.0),
            valid_rect_buffer: Some(2.0),
            ..EngineSection::default()
        }),
    };

    let resolved = apply_cli_overrides(merge_config(Some(file)), Some(1.5), None);

    assert_eq!(resolved.engine.discardable_factor, 1.5);
    assert_eq!(resolved.engine.valid_rect_buffer, 2.0, "unset flag keeps file value");
}

#[test]
#[serial(scrollstack_env)]
fn env_var_overrides_log_path() {
    env::set_var(LOG_FILE_ENV_VAR, "/tmp/from-env.log");
    let resolved = apply_env_overrides(ResolvedConfig::default());
    env::remove_var(LOG_FILE_ENV_VAR);

    assert_eq!(resolved.log_file_path, PathBuf::from("/tmp/from-env.log"));
}

#[test]
#[serial(scrollstack_env)]
fn explicit_path_beats_env_var() {
    let explicit = write_temp_config(
        "scrollstack_test_explicit.toml",
        "[engine]\ntrailing_inset = 1.0\n",
    );
    let from_env = write_temp_config(
        "scrollstack_test_env.toml",
        "[engine]\ntrailing_inset = 2.0\n",
    );
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let loaded = load_config_with_precedence(Some(explicit.clone()));
    let via_env = load_config_with_precedence(None);
    env::remove_var(CONFIG_ENV_VAR);

    let trailing = |cfg: Result<Option<ConfigFile>, ConfigError>| {
        cfg.expect("loads")
            .and_then(|c| c.engine)
            .and_then(|e| e.trailing_inset)
    };
    assert_eq!(trailing(loaded), Some(1.0));
    assert_eq!(trailing(via_env), Some(2.0));

    fs::remove_file(explicit).ok();
    fs::remove_file(from_env).ok();
}
