use classgraph::Settings;
use classgraph::io::OutputFormat;
use std::env;
use std::fs;
use tempfile::TempDir;

// One test per binary: it changes the working directory and process env.
#[test]
fn test_file_and_env_layering() {
    let temp_dir = TempDir::new().unwrap();
    let original_dir = env::current_dir().unwrap();

    let config_dir = temp_dir.path().join(".classgraph");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("settings.toml"),
        r#"
[resolver]
root_type = "Any"
allow_unresolved = false

[output]
format = "json"
"#,
    )
    .unwrap();

    // Config discovery walks up from nested directories
    let nested = temp_dir.path().join("src").join("model");
    fs::create_dir_all(&nested).unwrap();
    env::set_current_dir(&nested).unwrap();

    unsafe {
        // Double underscore separates nested levels
        env::set_var("CLASSGRAPH_RESOLVER__ALLOW_UNRESOLVED", "true");
        env::set_var("CLASSGRAPH_LOGGING__DEFAULT", "debug");
    }

    let settings = Settings::load();

    unsafe {
        env::remove_var("CLASSGRAPH_RESOLVER__ALLOW_UNRESOLVED");
        env::remove_var("CLASSGRAPH_LOGGING__DEFAULT");
    }
    env::set_current_dir(original_dir).unwrap();

    let settings = settings.unwrap();
    assert_eq!(settings.resolver.root_type, "Any");
    assert!(settings.resolver.allow_unresolved, "env should override file");
    assert_eq!(settings.logging.default, "debug");
    assert_eq!(settings.output.format, OutputFormat::Json);
    // Untouched sections keep their defaults
    assert_eq!(settings.resolver.root_aliases, vec!["java.lang.Object"]);
}
