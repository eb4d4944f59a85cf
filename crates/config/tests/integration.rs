//! Integration tests for fleet-config

#[cfg(test)]
mod tests {
    use fleet_config::Config;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[controller]
bind_addr = "0.0.0.0:7777"
command_timeout_s = 120

[agent]
controller_addr = "10.0.0.5:7420"

[concurrency]
max_parallel_installs = 16

[logging]
level = "debug"
json = true
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.controller.bind_addr, "0.0.0.0:7777");
        assert_eq!(config.controller.command_timeout_s, 120);
        assert_eq!(config.agent.controller_addr, "10.0.0.5:7420");
        assert_eq!(config.concurrency.max_parallel_installs, 16);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        // Untouched sections still fall back to their defaults.
        assert_eq!(config.network.retries, 3);
    }

    #[tokio::test]
    async fn test_partial_file_fills_in_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[controller]\nbind_addr = \"0.0.0.0:1\"\n").unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.controller.bind_addr, "0.0.0.0:1");
        assert_eq!(config.controller.command_timeout_s, 60);
        assert_eq!(config.agent.install_dir, std::path::PathBuf::from("/opt/seatunnel"));
    }

    #[tokio::test]
    async fn test_invalid_toml_is_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "not valid toml {{{{").unwrap();
        assert!(Config::load_from_file(temp_file.path()).await.is_err());
    }
}
