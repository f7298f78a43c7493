use crate::config::Config;
use crate::constants::COMMAND_DISPLAY_WIDTH;
use crate::discovery::{self, DiscoveryRecord};
use crate::utils::truncate_string;
use anyhow::{Context, Result};
use clap::ValueEnum;
use daprctl_common::{info_message, Colorize};
use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

const HEADERS: [&str; 9] = [
    "APP ID",
    "HTTP PORT",
    "GRPC PORT",
    "APP PORT",
    "COMMAND",
    "AGE",
    "CREATED",
    "DAPRD PID",
    "CLI PID",
];

pub async fn list(config: &Config, output: OutputFormat) -> Result<()> {
    let records = discovery::list(config).await?;

    if records.is_empty() && output == OutputFormat::Table {
        info_message!("No sidecars found.");
        return Ok(());
    }

    print!("{}", render_records(&records, output)?);
    Ok(())
}

/// Renders records in the requested format. The output always ends with a newline.
pub fn render_records(records: &[DiscoveryRecord], output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Table => Ok(render_table(records)),
        OutputFormat::Json => serde_json::to_string_pretty(records)
            .map(|json| json + "\n")
            .context("failed to render records as JSON"),
        OutputFormat::Yaml => {
            serde_yaml::to_string(records).context("failed to render records as YAML")
        }
    }
}

fn table_row(record: &DiscoveryRecord) -> Vec<String> {
    vec![
        record.app_id.clone(),
        record.http_port.to_string(),
        record.grpc_port.to_string(),
        record.app_port.to_string(),
        truncate_string(&record.launch_command, COMMAND_DISPLAY_WIDTH),
        record.age.clone(),
        record.created_display(),
        record.sidecar_pid.to_string(),
        record.supervisor_pid.to_string(),
    ]
}

fn render_table(records: &[DiscoveryRecord]) -> String {
    let header = HEADERS.iter().map(|h| h.to_string()).collect_vec();
    let rows = std::iter::once(header)
        .chain(records.iter().map(table_row))
        .collect_vec();

    let widths = (0..HEADERS.len())
        .map(|column| {
            rows.iter()
                .map(|row| row[column].chars().count())
                .max()
                .unwrap_or_default()
        })
        .collect_vec();

    rows.iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .join("  ")
                .trim_end()
                .to_string()
        })
        .map(|line| line + "\n")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record() -> DiscoveryRecord {
        DiscoveryRecord {
            app_id: "cart".to_string(),
            http_port: 3500,
            grpc_port: 50001,
            app_port: 8080,
            metrics_enabled: false,
            launch_command: "python3 -m flask run --port 8080".to_string(),
            age: "30s".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            supervisor_pid: 0,
            sidecar_pid: 4242,
        }
    }

    #[test]
    fn test_table_truncates_command() {
        let table = render_records(&[record()], OutputFormat::Table).unwrap();
        let lines = table.lines().collect_vec();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("APP ID"));
        assert!(lines[0].ends_with("CLI PID"));
        assert!(lines[1].starts_with("cart  "));
        assert!(lines[1].contains("python3 -m flask ..."));
        assert!(!lines[1].contains("--port"));
        assert!(lines[1].contains("4242"));
    }

    #[test]
    fn test_table_columns_line_up() {
        let mut second = record();
        second.app_id = "inventory-service".to_string();
        second.launch_command = "node app.js".to_string();

        let table = render_records(&[record(), second], OutputFormat::Table).unwrap();
        let lines = table.lines().collect_vec();
        let column = lines[0].find("HTTP PORT").unwrap();

        assert_eq!(lines[1].find("3500"), Some(column));
        assert_eq!(lines[2].find("3500"), Some(column));
    }

    #[test]
    fn test_json_keeps_full_command() {
        let json = render_records(&[record()], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["appId"], "cart");
        assert_eq!(value[0]["command"], "python3 -m flask run --port 8080");
        assert_eq!(value[0]["daprdPid"], 4242);
    }

    #[test]
    fn test_yaml_output() {
        let yaml = render_records(&[record()], OutputFormat::Yaml).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(value[0]["appId"].as_str(), Some("cart"));
        assert_eq!(value[0]["httpPort"].as_u64(), Some(3500));
    }

    #[test]
    fn test_empty_json_is_an_array() {
        assert_eq!(render_records(&[], OutputFormat::Json).unwrap(), "[]\n");
    }
}
