use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

fn temp_settings_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("gencms_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join(SETTINGS_FILE);
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn defaults_to_local_service() {
    let settings =
        load_settings_from(Path::new("/nonexistent/gencms.toml"), no_env).expect("settings");
    assert_eq!(settings, ApiSettings::default());
    assert_eq!(settings.api_base, "http://localhost:8000");
    assert_eq!(settings.request_deadline(), None);
}

#[test]
fn file_then_environment_override() {
    let path = temp_settings_file(
        "api_base = \"http://drafts.internal:9000/\"\nrequest_deadline_secs = 30\n",
    );

    let from_file = load_settings_from(&path, no_env).expect("file settings");
    assert_eq!(from_file.api_base, "http://drafts.internal:9000");
    assert_eq!(from_file.request_deadline(), Some(Duration::from_secs(30)));

    let from_env = load_settings_from(
        &path,
        env_from(&[
            ("GENCMS_API_BASE", "http://legacy:1"),
            ("APP__API_BASE", "https://gencms.example.org"),
            ("APP__REQUEST_DEADLINE_SECS", "5"),
        ]),
    )
    .expect("env settings");
    assert_eq!(from_env.api_base, "https://gencms.example.org");
    assert_eq!(from_env.request_deadline_secs, Some(5));

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn zero_deadline_means_none() {
    let settings = ApiSettings {
        api_base: DEFAULT_API_BASE.to_string(),
        request_deadline_secs: Some(0),
    };
    assert_eq!(settings.request_deadline(), None);
}

#[test]
fn blank_api_base_falls_back_to_default() {
    assert_eq!(normalize_api_base("   ").expect("blank"), DEFAULT_API_BASE);
}

#[test]
fn rejects_non_http_api_base() {
    let err = normalize_api_base("ftp://drafts").expect_err("ftp");
    assert!(err.to_string().contains("http or https"), "{err}");
    assert!(normalize_api_base("not a url").is_err());
}

#[test]
fn rejects_unparseable_deadline() {
    let err = load_settings_from(
        Path::new("/nonexistent/gencms.toml"),
        env_from(&[("APP__REQUEST_DEADLINE_SECS", "soon")]),
    )
    .expect_err("bad deadline");
    assert!(err.to_string().contains("APP__REQUEST_DEADLINE_SECS"));
}
