// src/export.rs
use crate::models::{LeadRecord, Result};
use chrono::Utc;
use std::io::Write;

pub struct LeadExporter;

impl LeadExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn export_to_csv(&self, records: &[LeadRecord], filename: &str) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = std::path::Path::new(filename).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::File::create(filename)?;

        writeln!(file, "first_name,last_name,company,email,title")?;
        for record in records {
            writeln!(
                file,
                "{},{},{},{},{}",
                csv_field(&record.first_name),
                csv_field(&record.last_name),
                csv_field(&record.company),
                csv_field(&record.email),
                csv_field(&record.title)
            )?;
        }

        println!("\nWrote {} records to {}", records.len(), filename);
        Ok(())
    }

    pub fn print_summary(&self, records: &[LeadRecord]) {
        let total = records.len();
        let with_email = records.iter().filter(|r| !r.email.is_empty()).count();
        let with_company = records.iter().filter(|r| !r.company.is_empty()).count();
        let with_title = records.iter().filter(|r| !r.title.is_empty()).count();
        let pct = |n: usize| 100.0 * n as f64 / total.max(1) as f64;

        println!("\n========== SUMMARY ==========");
        println!("Total records:       {}", total);
        println!("With email:          {} ({:.1}%)", with_email, pct(with_email));
        println!("With company name:   {} ({:.1}%)", with_company, pct(with_company));
        println!("With title:          {} ({:.1}%)", with_title, pct(with_title));
        println!("=============================");
    }

    pub fn generate_filename(&self, directory: &str) -> String {
        format!(
            "{}/leads_{}.csv",
            directory,
            Utc::now().format("%Y%m%d_%H%M%S")
        )
    }

    /// Summary plus CSV in one step; used for completed runs and for
    /// whatever the last checkpoint held when a run is interrupted.
    pub fn export_run(&self, records: &[LeadRecord], directory: &str) -> Result<String> {
        self.print_summary(records);
        let filename = self.generate_filename(directory);
        self.export_to_csv(records, &filename)?;
        Ok(filename)
    }
}

impl Default for LeadExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal RFC 4180 quoting; company names love commas.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(company: &str) -> LeadRecord {
        LeadRecord {
            first_name: "Juan".to_string(),
            last_name: "Dela Cruz".to_string(),
            company: company.to_string(),
            email: "juan@acme.ph".to_string(),
            title: "Manager".to_string(),
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.csv");
        let exporter = LeadExporter::new();

        exporter
            .export_to_csv(&[record("Acme Trading")], path.to_str().unwrap())
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("first_name,last_name,company,email,title"));
        assert_eq!(
            lines.next(),
            Some("Juan,Dela Cruz,Acme Trading,juan@acme.ph,Manager")
        );
    }

    #[test]
    fn export_run_writes_csv_and_returns_path() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = LeadExporter::new();

        let path = exporter
            .export_run(&[record("Acme Trading")], dir.path().to_str().unwrap())
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("first_name,last_name,company,email,title"));
        assert!(content.contains("Juan,Dela Cruz,Acme Trading"));
    }

    #[test]
    fn quotes_fields_with_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.csv");

        LeadExporter::new()
            .export_to_csv(&[record("Acme, Inc.")], path.to_str().unwrap())
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Acme, Inc.\""));
    }
}
