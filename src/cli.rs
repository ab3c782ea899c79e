//! Command-line interface definitions and argument parsing

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::{Enrichment, PipelineConfig, ThresholdSource};

/// Analyse purchase orders: enrich, split into low/high spenders and summarize
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the orders CSV file
    #[arg(short, long, default_value = "orders.csv")]
    pub input: String,

    /// Name of the column appended to every order
    #[arg(short = 'c', long, default_value = "Country")]
    pub enrich_column: String,

    /// Comma-separated values for the appended column, one per order
    #[arg(short, long, default_value = "GBR,AUS,USA,GBR,RUS,GBR,KOR,NZ")]
    pub enrich_values: String,

    /// Skip the enrichment step
    #[arg(long)]
    pub no_enrich: bool,

    /// Fixed spend threshold instead of the geometric mean of positive amounts
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Number of orders shown from each group
    #[arg(short = 'n', long, default_value = "5")]
    pub sample_size: usize,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Split the enrichment list on commas, trimming each value.
    /// Expected format: "GBR,AUS,USA"
    pub fn parse_enrich_values(&self) -> crate::Result<Vec<String>> {
        let values: Vec<String> = self
            .enrich_values
            .split(',')
            .map(|v| v.trim().to_string())
            .collect();
        if let Some(pos) = values.iter().position(|v| v.is_empty()) {
            anyhow::bail!(
                "Enrichment value {} is empty in '{}'",
                pos + 1,
                self.enrich_values
            );
        }
        Ok(values)
    }

    /// Build the pipeline configuration described by these arguments
    pub fn to_config(&self) -> crate::Result<PipelineConfig> {
        let enrichment = if self.no_enrich {
            None
        } else {
            Some(Enrichment {
                column: self.enrich_column.clone(),
                values: self.parse_enrich_values()?,
            })
        };

        let threshold = match self.threshold {
            Some(value) if !value.is_finite() => {
                anyhow::bail!("Threshold must be a finite number, got {}", value)
            }
            Some(value) => ThresholdSource::Fixed(value),
            None => ThresholdSource::GeometricMean,
        };

        Ok(PipelineConfig {
            input: PathBuf::from(&self.input),
            enrichment,
            threshold,
            sample_size: self.sample_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_args() -> Args {
        Args::parse_from(["orderstats"])
    }

    #[test]
    fn test_defaults_match_reference_run() {
        let config = default_args().to_config().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_parse_enrich_values() {
        let mut args = default_args();
        args.enrich_values = " GBR, AUS ,USA".to_string();
        assert_eq!(args.parse_enrich_values().unwrap(), vec!["GBR", "AUS", "USA"]);

        args.enrich_values = "GBR,,USA".to_string();
        assert!(args.parse_enrich_values().is_err());

        args.enrich_values = String::new();
        assert!(args.parse_enrich_values().is_err());
    }

    #[test]
    fn test_to_config_from_flags() {
        let args = Args::parse_from([
            "orderstats",
            "--input",
            "data/orders.csv",
            "--threshold",
            "25.5",
            "--no-enrich",
            "-n",
            "3",
        ]);
        let config = args.to_config().unwrap();

        assert_eq!(config.input, PathBuf::from("data/orders.csv"));
        assert_eq!(config.threshold, ThresholdSource::Fixed(25.5));
        assert!(config.enrichment.is_none());
        assert_eq!(config.sample_size, 3);
    }

    #[test]
    fn test_to_config_rejects_nan_threshold() {
        let mut args = default_args();
        args.threshold = Some(f64::NAN);
        assert!(args.to_config().is_err());
    }
}
