use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::atlas::{HeadDirectionRates, Metric, NodeRegistry, SimilarityMatrix};

use super::files::{read_optional, read_required};
use super::parse::{parse_distance_matrix, parse_rate_table};

const NODES_FILE: &str = "nodes.json";
const RATES_FILE: &str = "head_direction_rates_merged.csv";

/// Where the upstream analysis results live.
#[derive(Clone, Debug)]
pub struct DataSource {
    pub data_dir: PathBuf,
    /// Registry override; falls back to `<data_dir>/nodes.json`, then the
    /// built-in registry.
    pub nodes_path: Option<PathBuf>,
}

impl DataSource {
    fn table_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}

/// Everything the atlas needs before the first frame.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub nodes: NodeRegistry,
    pub rates: HeadDirectionRates,
    pub metric: Metric,
    pub matrix: SimilarityMatrix,
}

pub fn collect_dataset(source: &DataSource, metric: Metric) -> Result<Dataset> {
    if !source.data_dir.is_dir() {
        bail!(
            "results directory {} does not exist",
            source.data_dir.display()
        );
    }

    let nodes = load_registry(source)?;
    if nodes.is_empty() {
        bail!("language node registry is empty");
    }
    let rates = load_rates(source)?;
    let matrix = load_matrix(source, metric)?;

    info!(
        nodes = nodes.len(),
        metric = %metric,
        cells = matrix.cell_count(),
        rate_keys = rates.key_count(),
        "dataset loaded"
    );

    Ok(Dataset {
        nodes,
        rates,
        metric,
        matrix,
    })
}

fn load_registry(source: &DataSource) -> Result<NodeRegistry> {
    if let Some(path) = &source.nodes_path {
        let raw = read_required(path)?;
        return NodeRegistry::from_json(&raw)
            .with_context(|| format!("invalid node registry {}", path.display()));
    }

    let path = source.table_path(NODES_FILE);
    match read_optional(&path)? {
        Some(raw) => NodeRegistry::from_json(&raw)
            .with_context(|| format!("invalid node registry {}", path.display())),
        None => NodeRegistry::builtin(),
    }
}

/// A missing matrix file is "no data" for that metric, not an error.
pub fn load_matrix(source: &DataSource, metric: Metric) -> Result<SimilarityMatrix> {
    let path = source.table_path(metric.file_name());
    load_table(&path, parse_distance_matrix)
        .with_context(|| format!("failed to load {} distance matrix", metric.label()))
}

fn load_rates(source: &DataSource) -> Result<HeadDirectionRates> {
    let path = source.table_path(RATES_FILE);
    load_table(&path, parse_rate_table).context("failed to load head direction rates")
}

fn load_table<T: Default>(path: &Path, parse: fn(&str) -> Result<T>) -> Result<T> {
    match read_optional(path)? {
        Some(raw) => parse(&raw).with_context(|| format!("failed to parse {}", path.display())),
        None => {
            warn!(path = %path.display(), "table not found; treating as no data");
            Ok(T::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::atlas::WORD_ORDER_KEY;

    fn source(dir: &Path) -> DataSource {
        DataSource {
            data_dir: dir.to_path_buf(),
            nodes_path: None,
        }
    }

    #[test]
    fn collects_tables_from_a_results_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("upos_distance.csv"),
            ",English,Japanese\nEnglish,0,0.82\nJapanese,0.82,0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(RATES_FILE),
            "HeadUPOS,DepUPOS,DEPREL,English,Japanese\nVERBAL,NOMINAL,CORE_ARG,0.85,0.01\n",
        )
        .unwrap();

        let dataset = collect_dataset(&source(dir.path()), Metric::Upos).unwrap();
        assert_eq!(dataset.matrix.distance("English", "Japanese"), Some(0.82));
        assert_eq!(dataset.rates.rate(WORD_ORDER_KEY, "Japanese"), Some(0.01));
        assert!(dataset.nodes.get("ja").is_some());
    }

    #[test]
    fn missing_tables_degrade_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = collect_dataset(&source(dir.path()), Metric::Deprel).unwrap();
        assert!(dataset.matrix.is_empty());
        assert!(dataset.rates.is_empty());
        assert!(!dataset.nodes.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(collect_dataset(&source(&missing), Metric::Upos).is_err());
    }

    #[test]
    fn registry_file_in_the_data_dir_overrides_the_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(NODES_FILE),
            r#"[{"code": "eu", "name": "Basque", "lat": 43.26, "lng": -2.93}]"#,
        )
        .unwrap();
        let registry = load_registry(&source(dir.path())).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("eu").is_some());
    }

    #[test]
    fn explicit_registry_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let source = DataSource {
            data_dir: dir.path().to_path_buf(),
            nodes_path: Some(dir.path().join("custom.json")),
        };
        assert!(load_registry(&source).is_err());
    }

    #[test]
    fn malformed_matrix_reports_the_metric() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("phrase_distance.csv"), "just-a-header\n").unwrap();
        let error = load_matrix(&source(dir.path()), Metric::Phrase).unwrap_err();
        assert!(format!("{error:#}").contains("Phrase heads"));
    }
}
