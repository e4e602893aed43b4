//! Edge-list file handling for graph data

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use memmap2::Mmap;

use crate::graph::builder::GraphBuilder;
use crate::graph::{CompressedGraph, VertexId};

/// How an edge-list file is laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeListFormat {
    /// Field separator; an all-whitespace delimiter splits on any whitespace run
    pub delimiter: String,

    /// Skip a non-numeric first record (a CSV header row)
    pub skip_header: bool,
}

impl Default for EdgeListFormat {
    fn default() -> Self {
        Self {
            delimiter: " ".to_string(),
            skip_header: false,
        }
    }
}

impl EdgeListFormat {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, skip_header: bool) -> Self {
        self.skip_header = skip_header;
        self
    }

    fn fields<'a>(&'a self, line: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        if self.delimiter.trim().is_empty() {
            Box::new(line.split_whitespace())
        } else {
            Box::new(line.split(self.delimiter.as_str()).map(str::trim))
        }
    }
}

/// Load an undirected graph from an edge-list file
pub fn load_edge_list(path: &Path, format: &EdgeListFormat) -> Result<CompressedGraph> {
    log::info!("Reading edge list: {}", path.display());

    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }

    let file = File::open(path).with_context(|| format!("open edge list {}", path.display()))?;
    let len = file.metadata()?.len();
    if len == 0 {
        log::warn!("Edge list {} is empty", path.display());
        return parse_edge_list("", format);
    }

    // Safety: the file is only read, and is not expected to change while mapped.
    let mmap = unsafe { Mmap::map(&file).with_context(|| format!("mmap edge list {}", path.display()))? };
    let text = std::str::from_utf8(&mmap).with_context(|| format!("edge list {} is not UTF-8", path.display()))?;

    let graph = parse_edge_list(text, format)?;

    log::info!(
        "Loaded graph with {} nodes and {} edges (~{} bytes)",
        graph.node_count,
        graph.edge_count(),
        graph.memory_usage()
    );

    Ok(graph)
}

/// Parse edge-list text. `#` lines and blank lines are skipped, extra columns ignored.
pub fn parse_edge_list(text: &str, format: &EdgeListFormat) -> Result<CompressedGraph> {
    let mut builder = GraphBuilder::with_capacity(1024);
    let mut header_pending = format.skip_header;
    let mut edge_lines = 0usize;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = parse_edge(format, line);
        if header_pending {
            header_pending = false;
            if parsed.is_err() {
                log::debug!("Skipping header row: {}", line);
                continue;
            }
        }

        let (a, b) = parsed.with_context(|| format!("line {}: {:?}", line_no + 1, line))?;
        builder.add_edge(a, b);
        edge_lines += 1;
    }

    log::debug!("Parsed {} edge lines into {} vertices", edge_lines, builder.node_count());
    Ok(builder.build())
}

fn parse_edge(format: &EdgeListFormat, line: &str) -> Result<(VertexId, VertexId)> {
    let mut fields = format.fields(line);
    let mut next_id = |which: &str| -> Result<VertexId> {
        let field = fields
            .next()
            .ok_or_else(|| anyhow!("missing {} vertex", which))?;
        field
            .parse::<VertexId>()
            .with_context(|| format!("invalid {} vertex {:?}", which, field))
    };

    let source = next_id("source")?;
    let target = next_id("target")?;
    Ok((source, target))
}
