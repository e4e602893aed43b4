//! Annotated graph export module

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::cluster::detection::CoverageReport;
use crate::config::Config;
use crate::graph::{CompressedGraph, VertexId};
use crate::runner::{coverage_key, NibbleRun};

/// Role of a vertex under one configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    Community,
    Seed,
    NotCommunity,
    /// Claimed by an earlier coverage iteration
    Used,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Community => "community",
            Label::Seed => "seed",
            Label::NotCommunity => "not-community",
            Label::Used => "used",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels for every vertex, aligned with the graph's node indices
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub key: String,
    pub labels: Vec<Label>,
}

impl Annotation {
    fn build(graph: &CompressedGraph, key: String, used: &HashSet<VertexId>, community: &[VertexId], seed: VertexId) -> Self {
        let mut labels: Vec<Label> = graph
            .vertices()
            .map(|v| if used.contains(&v) { Label::Used } else { Label::NotCommunity })
            .collect();

        for &vertex in community {
            if let Some(&idx) = graph.id_to_index.get(&vertex) {
                labels[idx as usize] = Label::Community;
            }
        }
        if let Some(&idx) = graph.id_to_index.get(&seed) {
            labels[idx as usize] = Label::Seed;
        }

        Self { key, labels }
    }

    pub fn label_of(&self, graph: &CompressedGraph, vertex: VertexId) -> Option<Label> {
        graph.id_to_index.get(&vertex).map(|&idx| self.labels[idx as usize])
    }
}

/// Annotate a single nibble run
pub fn annotate_nibble(graph: &CompressedGraph, run: &NibbleRun) -> Annotation {
    Annotation::build(graph, run.key(), &HashSet::new(), &run.community, run.seed)
}

/// One annotation per coverage iteration; earlier claims are labelled `used`
pub fn annotate_coverage(graph: &CompressedGraph, report: &CoverageReport, config: &Config) -> Vec<Annotation> {
    let mut used: HashSet<VertexId> = HashSet::with_capacity(graph.node_count);
    let mut annotations = Vec::with_capacity(report.records.len());

    for record in &report.records {
        let key = coverage_key(config, record.seed, record.iteration);
        annotations.push(Annotation::build(graph, key, &used, &record.members, record.seed));
        used.extend(record.members.iter().copied());
    }

    annotations
}

/// Write annotations to `output_dir`
pub fn generate_visualizations(
    graph: &CompressedGraph,
    annotations: &[Annotation],
    output_dir: &Path,
) -> Result<()> {
    log::info!("Exporting {} annotations", annotations.len());

    fs::create_dir_all(output_dir)?;

    write_gexf(graph, annotations, &output_dir.join("annotated.gexf"))?;
    write_nodes_csv(graph, annotations, &output_dir.join("nodes.csv"))?;

    log::info!("Export written to {}", output_dir.display());

    Ok(())
}

/// Write the graph as GEXF with one string node attribute per annotation
pub fn write_gexf(graph: &CompressedGraph, annotations: &[Annotation], path: &Path) -> Result<()> {
    log::info!("Writing GEXF to {}", path.display());

    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(file, "<gexf xmlns=\"http://www.gexf.net/1.2draft\" version=\"1.2\">")?;
    writeln!(file, "  <graph mode=\"static\" defaultedgetype=\"undirected\">")?;

    writeln!(file, "    <attributes class=\"node\">")?;
    for (i, annotation) in annotations.iter().enumerate() {
        writeln!(
            file,
            "      <attribute id=\"{}\" title=\"{}\" type=\"string\"/>",
            i,
            xml_escape(&annotation.key)
        )?;
    }
    writeln!(file, "    </attributes>")?;

    writeln!(file, "    <nodes>")?;
    for (idx, id) in graph.vertices().enumerate() {
        if annotations.is_empty() {
            writeln!(file, "      <node id=\"{}\" label=\"{}\"/>", id, id)?;
            continue;
        }

        writeln!(file, "      <node id=\"{}\" label=\"{}\">", id, id)?;
        writeln!(file, "        <attvalues>")?;
        for (i, annotation) in annotations.iter().enumerate() {
            writeln!(
                file,
                "          <attvalue for=\"{}\" value=\"{}\"/>",
                i, annotation.labels[idx]
            )?;
        }
        writeln!(file, "        </attvalues>")?;
        writeln!(file, "      </node>")?;
    }
    writeln!(file, "    </nodes>")?;

    writeln!(file, "    <edges>")?;
    let mut edge_id = 0;
    for src in 0..graph.node_count {
        for &dst in graph.neighbor_indices(src) {
            // Each undirected edge once
            if (dst as usize) > src {
                writeln!(
                    file,
                    "      <edge id=\"{}\" source=\"{}\" target=\"{}\"/>",
                    edge_id,
                    graph.id_at(src),
                    graph.id_at(dst as usize)
                )?;
                edge_id += 1;
            }
        }
    }
    writeln!(file, "    </edges>")?;

    writeln!(file, "  </graph>")?;
    writeln!(file, "</gexf>")?;
    file.flush()?;

    Ok(())
}

/// Write `id,degree,<key>...` rows, one per vertex
pub fn write_nodes_csv(graph: &CompressedGraph, annotations: &[Annotation], path: &Path) -> Result<()> {
    log::info!("Writing node table to {}", path.display());

    let mut file = BufWriter::new(File::create(path)?);

    let header = std::iter::once("id".to_string())
        .chain(std::iter::once("degree".to_string()))
        .chain(annotations.iter().map(|a| a.key.clone()))
        .join(",");
    writeln!(file, "{}", header)?;

    for (idx, id) in graph.vertices().enumerate() {
        let labels = annotations.iter().map(|a| a.labels[idx].as_str()).join(",");
        if labels.is_empty() {
            writeln!(file, "{},{}", id, graph.degree_at(idx))?;
        } else {
            writeln!(file, "{},{},{}", id, graph.degree_at(idx), labels)?;
        }
    }
    file.flush()?;

    Ok(())
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{CommunityRecord, CutMetric, Variant};
    use crate::cluster::detection::CoverageState;
    use crate::graph::builder::GraphBuilder;
    use crate::runner::run_nibble;

    fn two_triangles() -> CompressedGraph {
        GraphBuilder::from_edges(&[(1, 2), (2, 3), (3, 1), (4, 5), (5, 6), (6, 4)])
    }

    #[test]
    fn test_nibble_labels() {
        let graph = two_triangles();
        let config = Config::new(Variant::PageRank, CutMetric::Conductance, 0, 200, 1e-7);
        let run = run_nibble(&graph, 1, &config).unwrap();

        let annotation = annotate_nibble(&graph, &run);
        assert_eq!(annotation.label_of(&graph, 1), Some(Label::Seed));
        assert_eq!(annotation.label_of(&graph, 2), Some(Label::Community));
        assert_eq!(annotation.label_of(&graph, 3), Some(Label::Community));
        assert_eq!(annotation.label_of(&graph, 5), Some(Label::NotCommunity));
    }

    #[test]
    fn test_coverage_labels_mark_earlier_claims_used() {
        let graph = two_triangles();
        let report = CoverageReport {
            records: vec![
                CommunityRecord { iteration: 0, seed: 1, members: vec![1, 2, 3], k: 3, quality: 0.0 },
                CommunityRecord { iteration: 1, seed: 4, members: vec![4, 5], k: 2, quality: 1.0 },
            ],
            state: CoverageState::Stalled,
            used: vec![1, 2, 3, 4, 5],
        };

        let annotations = annotate_coverage(&graph, &report, &Config::default());
        assert_eq!(annotations.len(), 2);

        let second = &annotations[1];
        assert_eq!(second.label_of(&graph, 2), Some(Label::Used));
        assert_eq!(second.label_of(&graph, 4), Some(Label::Seed));
        assert_eq!(second.label_of(&graph, 5), Some(Label::Community));
        assert_eq!(second.label_of(&graph, 6), Some(Label::NotCommunity));
        assert!(second.key.ends_with("_i=1"));
    }

    #[test]
    fn test_export_files() {
        let graph = two_triangles();
        let annotation = Annotation {
            key: "v=pr_s=1".to_string(),
            labels: vec![Label::Seed, Label::Community, Label::Community, Label::NotCommunity, Label::NotCommunity, Label::NotCommunity],
        };
        let dir = tempfile::tempdir().unwrap();

        generate_visualizations(&graph, &[annotation], dir.path()).unwrap();

        let gexf = fs::read_to_string(dir.path().join("annotated.gexf")).unwrap();
        assert!(gexf.contains("title=\"v=pr_s=1\""));
        assert_eq!(gexf.matches("<edge ").count(), 6);
        assert!(gexf.contains("value=\"seed\""));

        let csv = fs::read_to_string(dir.path().join("nodes.csv")).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "id,degree,v=pr_s=1");
        assert_eq!(lines[1], "1,2,seed");
        assert_eq!(lines.len(), 7);
    }
}
