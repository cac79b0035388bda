//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.telemetry.base_url, "https://api.thingspeak.com");
        assert_eq!(config.telemetry.value_field, "field1");
        assert_eq!(config.telemetry.timeout_secs, 5);
        assert_eq!(config.models.dir, "models");
        assert_eq!(config.models.decision_tree_file, "decision_tree_model.json");
        assert_eq!(config.models.knn_file, "knn_model.json");
    }

    #[test]
    fn test_server_config() {
        let toml_str = r#"
host = "127.0.0.1"
port = 8080
"#;
        let config: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_telemetry_config() {
        let toml_str = r#"
channel_id = "2437512"
field_id = "3"
read_api_key = "READKEY"
timeout_secs = 2
"#;
        let config: TelemetryConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.channel_id, "2437512");
        assert_eq!(config.field_id, "3");
        assert_eq!(config.read_api_key, "READKEY");
        assert_eq!(config.timeout_secs, 2);
        assert_eq!(config.value_field, "field1"); // default kept
    }

    #[test]
    fn test_models_config_paths() {
        let toml_str = r#"
dir = "/opt/models"
knn_file = "knn_v2.json"
"#;
        let config: ModelsConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.decision_tree_path(),
            std::path::PathBuf::from("/opt/models/decision_tree_model.json")
        );
        assert_eq!(
            config.knn_path(),
            std::path::PathBuf::from("/opt/models/knn_v2.json")
        );
    }

    #[test]
    fn test_models_dir_home_expansion() {
        if std::env::var_os("HOME").is_none() {
            return;
        }
        let config = ModelsConfig {
            dir: "~/models".to_string(),
            ..ModelsConfig::default()
        };
        assert!(!config.resolved_dir().to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[telemetry]
channel_id = "42"
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.telemetry.channel_id, "42");
        assert_eq!(config.models.dir, "models");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/water-quality.toml").unwrap();
        assert_eq!(config.telemetry.timeout_secs, 5);
    }
}
