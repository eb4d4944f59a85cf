//! Plugin name to Maven artifact-id alias table (§4.8 `install_plugins`)

/// Plugins whose artifact id does not simply follow `connector-<name>`.
const FIXED_ALIASES: &[(&str, &str)] = &[
    ("mysql-cdc", "connector-cdc-mysql"),
    ("postgres-cdc", "connector-cdc-postgres"),
    ("mongodb-cdc", "connector-cdc-mongodb"),
    ("sqlserver-cdc", "connector-cdc-sqlserver"),
    ("oracle-cdc", "connector-cdc-oracle"),
    ("cosfile", "connector-file-cos"),
    ("s3file", "connector-file-s3"),
    ("obsfile", "connector-file-obs"),
    ("ftpfile", "connector-file-ftp"),
];

/// Plugin names that fold into the single `connector-jdbc` artifact, each
/// configured at runtime by a `driver` field rather than a distinct jar.
const JDBC_FAMILY: &[&str] = &[
    "jdbc",
    "mysql-jdbc",
    "postgres-jdbc",
    "oracle-jdbc",
    "sqlserver-jdbc",
    "clickhouse-jdbc",
    "db2-jdbc",
    "oceanbase-jdbc",
];

/// Resolves a plugin name to the Maven artifact id whose jar is named
/// `<artifact>-<version>.jar` under `connectors/`.
///
/// Unknown names fall back to `connector-<name>`, which matches the
/// naming convention used by every connector that doesn't need a fixed
/// alias.
#[must_use]
pub fn resolve_artifact_id(plugin_name: &str) -> String {
    if let Some((_, artifact)) = FIXED_ALIASES.iter().find(|(name, _)| *name == plugin_name) {
        return (*artifact).to_string();
    }
    if JDBC_FAMILY.contains(&plugin_name) {
        return "connector-jdbc".to_string();
    }
    format!("connector-{plugin_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_fixed_aliases() {
        assert_eq!(resolve_artifact_id("mysql-cdc"), "connector-cdc-mysql");
        assert_eq!(resolve_artifact_id("cosfile"), "connector-file-cos");
    }

    #[test]
    fn resolves_jdbc_family_to_shared_artifact() {
        assert_eq!(resolve_artifact_id("postgres-jdbc"), "connector-jdbc");
        assert_eq!(resolve_artifact_id("jdbc"), "connector-jdbc");
    }

    #[test]
    fn falls_back_to_connector_prefix() {
        assert_eq!(resolve_artifact_id("kafka"), "connector-kafka");
    }
}
