use std::path::PathBuf;
use std::time::Duration;

use burrow::config::{Config, ServerConfig};

#[test]
fn test_config_from_env() {
    // Single test touching the environment so parallel tests cannot race on it
    unsafe {
        std::env::remove_var("GOPHER_CONFIG");
        std::env::remove_var("LISTEN");
        std::env::remove_var("GOPHER_HOSTNAME");
        std::env::remove_var("GOPHER_ROOT");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.server.bind_addr(), "0.0.0.0:70");

    unsafe {
        std::env::set_var("LISTEN", "127.0.0.1:7070");
        std::env::set_var("GOPHER_HOSTNAME", "gopher.example");
        std::env::set_var("GOPHER_ROOT", "/srv/gopher");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.bind_addr(), "127.0.0.1:7070");
    assert_eq!(cfg.server.hostname.as_deref(), Some("gopher.example"));
    assert_eq!(cfg.files.root, Some(PathBuf::from("/srv/gopher")));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gopher.yaml");
    std::fs::write(&path, "server:\n  listen_addr: \":7071\"\n").unwrap();
    unsafe {
        std::env::set_var("GOPHER_CONFIG", &path);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.bind_addr(), "0.0.0.0:7071");
    // the file wins over the plain variables entirely
    assert_eq!(cfg.server.hostname, None);

    unsafe {
        std::env::remove_var("GOPHER_CONFIG");
        std::env::remove_var("LISTEN");
        std::env::remove_var("GOPHER_HOSTNAME");
        std::env::remove_var("GOPHER_ROOT");
    }
}

#[test]
fn test_config_from_yaml() {
    let raw = r#"
server:
  listen_addr: "0.0.0.0:7070"
  hostname: gopher.example
  max_connections: 64
  read_timeout_secs: 5
files:
  root: /var/gopher
"#;
    let cfg = Config::from_yaml(raw).unwrap();

    assert_eq!(cfg.server.listen_addr.as_deref(), Some("0.0.0.0:7070"));
    assert_eq!(cfg.server.max_connections, Some(64));
    assert_eq!(cfg.server.read_timeout(), Some(Duration::from_secs(5)));
    assert_eq!(cfg.files.root, Some(PathBuf::from("/var/gopher")));
}

#[test]
fn test_config_yaml_partial() {
    let cfg = Config::from_yaml("files:\n  root: pub\n").unwrap();

    assert_eq!(cfg.server, ServerConfig::default());
    assert_eq!(cfg.server.read_timeout(), None);
}

#[test]
fn test_config_yaml_invalid() {
    assert!(Config::from_yaml("server: [not, a, map]").is_err());
}

#[test]
fn test_config_missing_file() {
    assert!(Config::from_file("/nonexistent/gopher.yaml").is_err());
}

#[test]
fn test_bind_addr_forms() {
    let cfg = |addr: &str| ServerConfig {
        listen_addr: Some(addr.to_string()),
        ..ServerConfig::default()
    };

    assert_eq!(cfg("").bind_addr(), "0.0.0.0:70");
    assert_eq!(cfg(":7070").bind_addr(), "0.0.0.0:7070");
    assert_eq!(cfg("localhost:7000").bind_addr(), "localhost:7000");
}
