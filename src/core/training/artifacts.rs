//! Training artifact bundle: typed entries, fixed display groups, and the
//! CSV table view.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Image,
    Text,
}

/// One named entry of a training-results bundle. Image payloads are base64
/// JPEG/PNG data; text payloads are the file contents verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingArtifact {
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub data: String,
}

/// Mapping from artifact name (e.g. `results.csv`) to artifact. Immutable
/// once delivered for a given training folder.
pub type ArtifactBundle = HashMap<String, TrainingArtifact>;

/// Fixed display groups, membership by exact filename.
pub const ARTIFACT_GROUPS: &[(&str, &[&str])] = &[
    ("Labels", &["labels.jpg", "labels_correlogram.jpg"]),
    (
        "Curves",
        &["F1_curve.png", "PR_curve.png", "P_curve.png", "R_curve.png"],
    ),
    (
        "Confusion Matrices",
        &["confusion_matrix.png", "confusion_matrix_normalized.png"],
    ),
    (
        "Training Batches",
        &["train_batch0.jpg", "train_batch1.jpg", "train_batch2.jpg"],
    ),
    (
        "Validation Batches",
        &["val_batch0_labels.jpg", "val_batch0_pred.jpg"],
    ),
    ("Training Configs", &["args.yaml"]),
    ("CSV", &["results.csv"]),
];

/// Organize a bundle into the fixed groups. Artifacts absent from the bundle
/// are skipped with a diagnostic; they are expected to be missing for runs
/// that were stopped early.
pub fn grouped(
    bundle: &ArtifactBundle,
) -> Vec<(&'static str, Vec<(&'static str, &TrainingArtifact)>)> {
    ARTIFACT_GROUPS
        .iter()
        .map(|(group, files)| {
            let entries = files
                .iter()
                .filter_map(|file| match bundle.get(*file) {
                    Some(artifact) => Some((*file, artifact)),
                    None => {
                        debug!("artifact not found in results: {file}");
                        None
                    }
                })
                .collect();
            (*group, entries)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableView {
    Default,
    Fullscreen,
}

/// Parsed CSV artifact. Splitting is a naive comma split; quoted fields are
/// not handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Data rows shown by the default (non-fullscreen) view.
    pub const DEFAULT_ROW_LIMIT: usize = 10;

    pub fn parse(data: &str) -> Self {
        let trimmed = data.trim();
        if trimmed.is_empty() {
            return Self {
                header: Vec::new(),
                rows: Vec::new(),
            };
        }

        let mut lines = trimmed.split('\n');
        let header = lines
            .next()
            .map(|line| line.split(',').map(str::to_string).collect())
            .unwrap_or_default();
        let rows = lines
            .map(|line| line.split(',').map(str::to_string).collect())
            .collect();

        Self { header, rows }
    }

    pub fn visible_rows(&self, view: TableView) -> &[Vec<String>] {
        match view {
            TableView::Fullscreen => &self.rows,
            TableView::Default => {
                let limit = self.rows.len().min(Self::DEFAULT_ROW_LIMIT);
                &self.rows[..limit]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(data: &str) -> TrainingArtifact {
        TrainingArtifact {
            kind: ArtifactKind::Image,
            data: data.to_string(),
        }
    }

    #[test]
    fn bundle_wire_shape_round_trips() {
        let json = r#"{"results.csv":{"type":"text","data":"a,b\n1,2"},"labels.jpg":{"type":"image","data":"AAAA"}}"#;
        let bundle: ArtifactBundle = serde_json::from_str(json).expect("parse bundle");

        assert_eq!(bundle["results.csv"].kind, ArtifactKind::Text);
        assert_eq!(bundle["labels.jpg"].kind, ArtifactKind::Image);
        assert_eq!(bundle["labels.jpg"].data, "AAAA");
    }

    #[test]
    fn grouping_skips_absent_artifacts() {
        let mut bundle = ArtifactBundle::new();
        bundle.insert("labels.jpg".to_string(), image("AAAA"));
        bundle.insert("F1_curve.png".to_string(), image("BBBB"));

        let groups = grouped(&bundle);
        assert_eq!(groups.len(), ARTIFACT_GROUPS.len());

        let labels = groups.iter().find(|(name, _)| *name == "Labels").unwrap();
        assert_eq!(labels.1.len(), 1);
        assert_eq!(labels.1[0].0, "labels.jpg");

        let csv = groups.iter().find(|(name, _)| *name == "CSV").unwrap();
        assert!(csv.1.is_empty());
    }

    #[test]
    fn csv_table_parses_header_and_rows() {
        let table = CsvTable::parse("a,b\n1,2\n3,4");
        assert_eq!(table.header, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.visible_rows(TableView::Default).len(), 2);
        assert_eq!(table.visible_rows(TableView::Fullscreen).len(), 2);
    }

    #[test]
    fn default_view_caps_rows_and_fullscreen_shows_all() {
        let mut data = String::from("epoch,loss");
        for i in 0..15 {
            data.push_str(&format!("\n{i},0.{i}"));
        }
        let table = CsvTable::parse(&data);

        assert_eq!(table.rows.len(), 15);
        assert_eq!(table.visible_rows(TableView::Default).len(), 10);
        assert_eq!(table.visible_rows(TableView::Fullscreen).len(), 15);
        assert_eq!(table.visible_rows(TableView::Default)[0][0], "0");
    }

    #[test]
    fn naive_split_does_not_honor_quoted_fields() {
        let table = CsvTable::parse("name,note\nrun,\"a,b\"");
        assert_eq!(table.rows[0], vec!["run", "\"a", "b\""]);
    }

    #[test]
    fn empty_csv_yields_empty_table() {
        let table = CsvTable::parse("   \n  ");
        assert!(table.header.is_empty());
        assert!(table.rows.is_empty());
    }
}
