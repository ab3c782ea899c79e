//! Load → enrich → split → summarize, wired together from one configuration

use anyhow::Context;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::data::read_orders;
use crate::report::render_sample;
use crate::stats::{spending_threshold, summarize, Summary};
use crate::transform::{enrich, split};

/// Country codes appended to the reference orders file
pub const DEFAULT_COUNTRIES: [&str; 8] = ["GBR", "AUS", "USA", "GBR", "RUS", "GBR", "KOR", "NZ"];

/// A column of externally sourced values to append after loading
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub column: String,
    pub values: Vec<String>,
}

impl Default for Enrichment {
    fn default() -> Self {
        Self {
            column: "Country".to_string(),
            values: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Where the low/high spending threshold comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdSource {
    /// Geometric mean of the positive amounts
    GeometricMean,
    Fixed(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    /// `None` skips enrichment
    pub enrichment: Option<Enrichment>,
    pub threshold: ThresholdSource,
    /// Rows printed from each partition
    pub sample_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("orders.csv"),
            enrichment: Some(Enrichment::default()),
            threshold: ThresholdSource::GeometricMean,
            sample_size: 5,
        }
    }
}

/// Outcome of a full run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub threshold: f64,
    pub low_count: usize,
    pub high_count: usize,
    pub summary: Summary,
}

/// The order analysis, parameterized by its configuration
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage, writing the samples and facts to `out`.
    ///
    /// Stage failures surface as [`crate::error::TransformError`] inside the
    /// returned error; anything already written stays written.
    pub fn run<W: Write>(&self, out: &mut W) -> crate::Result<RunReport> {
        let mut orders = read_orders(&self.config.input)?;

        if let Some(enrichment) = &self.config.enrichment {
            enrich(&mut orders, &enrichment.column, enrichment.values.iter().cloned())?;
        }

        let threshold = match self.config.threshold {
            ThresholdSource::GeometricMean => spending_threshold(&orders)?,
            ThresholdSource::Fixed(value) => value,
        };
        info!("spending threshold is {:.4}", threshold);

        let (low, high) = split(&orders, threshold)?;
        info!("{} low spending and {} high spending orders", low.len(), high.len());

        let n = self.config.sample_size;
        writeln!(out, "A sample of low spending orders:")?;
        writeln!(out, "{}\n", render_sample(&low, n))?;
        writeln!(out, "A sample of high spending orders:")?;
        writeln!(out, "{}\n", render_sample(&high, n))?;

        let summary = summarize(&orders)?;
        writeln!(out, "{}", summary).context("writing summary")?;

        Ok(RunReport {
            threshold,
            low_count: low.len(),
            high_count: high.len(),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "customer,amount,date").unwrap();
        writeln!(file, "A,10,2020-01-01").unwrap();
        writeln!(file, "B,0,2020-01-02").unwrap();
        writeln!(file, "C,40,2020-01-03").unwrap();
        writeln!(file, "D,5,2020-01-04").unwrap();
        file
    }

    fn config_for(file: &NamedTempFile) -> PipelineConfig {
        PipelineConfig {
            input: file.path().to_path_buf(),
            enrichment: Some(Enrichment {
                column: "Country".to_string(),
                values: vec!["GBR".into(), "AUS".into(), "USA".into(), "GBR".into()],
            }),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.input, PathBuf::from("orders.csv"));
        assert_eq!(config.sample_size, 5);
        assert_eq!(config.threshold, ThresholdSource::GeometricMean);
        assert_eq!(config.enrichment.unwrap().values.len(), 8);
    }

    #[test]
    fn test_run_reference_scenario() {
        let file = create_test_csv();
        let pipeline = Pipeline::new(config_for(&file));
        assert_eq!(pipeline.config().input, file.path());

        let mut out = Vec::new();
        let report = pipeline.run(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!((report.threshold - 12.599).abs() < 1e-3);
        assert_eq!(report.low_count, 3);
        assert_eq!(report.high_count, 1);
        assert_eq!(report.summary.highest_customer, "C");

        assert!(text.starts_with("A sample of low spending orders:\n"));
        assert!(text.contains("A sample of high spending orders:\n"));
        assert!(text.contains("Country"));
        assert!(text.ends_with("Most orders happened in January.\n"));
    }

    #[test]
    fn test_run_with_fixed_threshold() {
        let file = create_test_csv();
        let config = PipelineConfig {
            threshold: ThresholdSource::Fixed(5.0),
            enrichment: None,
            ..config_for(&file)
        };

        let report = Pipeline::new(config).run(&mut Vec::<u8>::new()).unwrap();
        assert_eq!(report.threshold, 5.0);
        assert_eq!(report.low_count, 1);
        assert_eq!(report.high_count, 3);
    }

    #[test]
    fn test_run_surfaces_shape_mismatch() {
        let file = create_test_csv();
        let config = PipelineConfig {
            input: file.path().to_path_buf(),
            ..PipelineConfig::default()
        };

        let mut out: Vec<u8> = Vec::new();
        let err = Pipeline::new(config).run(&mut out).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TransformError>(),
            Some(TransformError::ShapeMismatch { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_keeps_samples_when_summary_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "customer,amount,date").unwrap();
        let config = PipelineConfig {
            input: file.path().to_path_buf(),
            enrichment: None,
            threshold: ThresholdSource::Fixed(10.0),
            sample_size: 5,
        };

        let mut out: Vec<u8> = Vec::new();
        let err = Pipeline::new(config).run(&mut out).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TransformError>(),
            Some(TransformError::Domain(_))
        ));
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("A sample of high spending orders:\nEmpty table"));
    }
}
