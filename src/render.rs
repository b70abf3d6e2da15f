//! Presentation of results on stdout

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use serde::Deserialize;

use nodescope_types::Entry;

/// Output format for extracted entries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `address:path:line: LEVEL [timestamp] message`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

pub fn write_entries<W: Write>(out: &mut W, entries: &[Entry], format: OutputFormat) -> Result<()> {
    for entry in entries {
        match format {
            OutputFormat::Text => writeln!(out, "{}", format_entry(entry))?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, entry)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

pub fn write_groups<W: Write>(out: &mut W, groups: &[String]) -> Result<()> {
    writeln!(out, "Datacenters:")?;
    for group in groups {
        writeln!(out, "{group}")?;
    }
    out.flush()?;
    Ok(())
}

fn format_entry(entry: &Entry) -> String {
    format!(
        "{}:{}:{}: {} [{}] {}",
        entry.source_address,
        entry.origin_path.display(),
        entry.line_number,
        entry.severity,
        entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        entry.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodescope_logs::{LineClassifier, LineKind};
    use std::path::PathBuf;

    fn entry() -> Entry {
        let text = "ERROR [main] 2023-07-13 12:00:00,042 failure X";
        let LineKind::Header(header) = LineClassifier::classify(text) else {
            panic!("expected a header line");
        };
        Entry {
            severity: header.severity,
            timestamp: header.timestamp,
            line_number: 7,
            source_address: "10.0.0.1".to_string(),
            origin_path: PathBuf::from("diag/nodes/10.0.0.1/logs/cassandra/system.log"),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_text_format() {
        let mut out = Vec::new();
        write_entries(&mut out, &[entry()], OutputFormat::Text).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "10.0.0.1:diag/nodes/10.0.0.1/logs/cassandra/system.log:7: ERROR \
             [2023-07-13 12:00:00.042] ERROR [main] 2023-07-13 12:00:00,042 failure X\n"
        );
    }

    #[test]
    fn test_json_format() {
        let mut out = Vec::new();
        write_entries(&mut out, &[entry(), entry()], OutputFormat::Json).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["severity"], "ERROR");
        assert_eq!(value["source_address"], "10.0.0.1");
        assert_eq!(value["line_number"], 7);
        assert_eq!(value["timestamp"], "2023-07-13T12:00:00.042");
    }

    #[test]
    fn test_groups() {
        let mut out = Vec::new();
        write_groups(&mut out, &["DC1".to_string(), "DC2".to_string()]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Datacenters:\nDC1\nDC2\n");
    }
}
