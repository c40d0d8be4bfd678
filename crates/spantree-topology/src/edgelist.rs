//! Edge-list text format.
//!
//! ```text
//! # triangle
//! 3        # vertex count V
//! 3        # edge count E
//! 0 1
//! 1 2
//! 0 2
//! ```
//!
//! Tokens are whitespace separated, so `V E` on one line also works. Blank
//! lines and `#` comments are ignored. Edges are one pair per line.
//!
//! The declared vertex count is checked against a limit before anything is
//! allocated. [`parse`] and [`read`] use [`DEFAULT_VERTEX_LIMIT`].

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::{Graph, Result, TopologyError, MAX_VERTICES};

/// Largest vertex count [`parse`] and [`read`] accept.
pub const DEFAULT_VERTEX_LIMIT: usize = 1 << 22;

/// Parse an edge list into a [`Graph`].
pub fn parse(input: &str) -> Result<Graph> {
    parse_with_limit(input, DEFAULT_VERTEX_LIMIT)
}

/// Parse an edge list declaring at most `max_vertices` vertices.
///
/// `max_vertices` is clamped to [`MAX_VERTICES`].
pub fn parse_with_limit(input: &str, max_vertices: usize) -> Result<Graph> {
    let mut tokens = Tokens::new(input);

    let limit = max_vertices.min(MAX_VERTICES) as u64;
    let (line, vertex_count) = tokens.number("vertex count")?;
    if vertex_count > limit {
        return Err(TopologyError::Parse {
            line,
            reason: format!("vertex count {vertex_count} exceeds the limit of {limit}"),
        });
    }
    let (_, declared) = tokens.number("edge count")?;
    let declared = declared as usize;

    let mut graph = Graph::with_vertices(vertex_count as usize)?;
    let mut found = 0;
    while let Some((line, fields)) = tokens.next_line() {
        let [u, v] = fields.as_slice() else {
            return Err(TopologyError::Parse {
                line,
                reason: format!("expected a vertex pair, found {} field(s)", fields.len()),
            });
        };
        let u = graph.vertex(parse_id(line, u)?)?;
        let v = graph.vertex(parse_id(line, v)?)?;
        graph.add_edge(u, v)?;
        found += 1;
    }

    if found != declared {
        return Err(TopologyError::EdgeCountMismatch { declared, found });
    }
    Ok(graph)
}

/// Read and parse an edge-list file.
pub fn read(path: impl AsRef<Path>) -> Result<Graph> {
    read_with_limit(path, DEFAULT_VERTEX_LIMIT)
}

/// [`read`] with an explicit vertex limit, as in [`parse_with_limit`].
pub fn read_with_limit(path: impl AsRef<Path>, max_vertices: usize) -> Result<Graph> {
    let text = fs::read_to_string(path)?;
    parse_with_limit(&text, max_vertices)
}

/// Render a graph in edge-list format (one edge per line, smaller id first).
pub fn render(graph: &Graph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", graph.vertex_count());
    let _ = writeln!(out, "{}", graph.edge_count());
    for (u, v) in graph.edges() {
        let _ = writeln!(out, "{u} {v}");
    }
    out
}

/// Write a graph to an edge-list file.
pub fn write(path: impl AsRef<Path>, graph: &Graph) -> Result<()> {
    fs::write(path, render(graph))?;
    Ok(())
}

fn parse_id(line: usize, token: &str) -> Result<u64> {
    token.parse().map_err(|_| TopologyError::Parse {
        line,
        reason: format!("invalid vertex id {token:?}"),
    })
}

/// Line-aware tokenizer: the two header numbers may share a line or not,
/// every following line is one edge.
struct Tokens<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    pending: Vec<&'a str>,
    pending_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
            pending: Vec::new(),
            pending_line: 0,
        }
    }

    fn number(&mut self, what: &str) -> Result<(usize, u64)> {
        if self.pending.is_empty() {
            match self.next_line() {
                Some((line, fields)) => {
                    self.pending = fields;
                    self.pending.reverse();
                    self.pending_line = line;
                }
                None => {
                    return Err(TopologyError::Parse {
                        line: self.pending_line.max(1),
                        reason: format!("missing {what}"),
                    })
                }
            }
        }
        let line = self.pending_line;
        let token = self.pending.pop().unwrap_or_default();
        let value = token.parse().map_err(|_| TopologyError::Parse {
            line,
            reason: format!("invalid {what} {token:?}"),
        })?;
        Ok((line, value))
    }

    /// Next non-empty line as fields, after any header leftovers.
    fn next_line(&mut self) -> Option<(usize, Vec<&'a str>)> {
        if !self.pending.is_empty() {
            let mut fields = std::mem::take(&mut self.pending);
            fields.reverse();
            return Some((self.pending_line, fields));
        }
        for (index, raw) in self.lines.by_ref() {
            let content = raw.split('#').next().unwrap_or_default();
            let fields: Vec<_> = content.split_whitespace().collect();
            if !fields.is_empty() {
                return Some((index + 1, fields));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeId;

    #[test]
    fn parses_separate_header_lines() {
        let g = parse("4\n3\n0 1\n1 2\n2 3\n").unwrap();
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.edge_count(), 3);
        assert!(g.has_edge(NodeId(2), NodeId(3)));
    }

    #[test]
    fn parses_header_on_one_line_with_comments() {
        let text = "# a path\n3 2   # V E\n\n0 1\n1 2 # last\n";
        let g = parse(text).unwrap();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn rejects_out_of_range_vertex() {
        let err = parse("2\n1\n0 2\n").unwrap_err();
        assert!(matches!(
            err,
            TopologyError::InvalidVertex { vertex: 2, vertex_count: 2 }
        ));
    }

    #[test]
    fn rejects_malformed_pair() {
        let err = parse("3\n1\n0 1 2\n").unwrap_err();
        assert!(matches!(err, TopologyError::Parse { line: 3, .. }));

        let err = parse("3\n1\n0 x\n").unwrap_err();
        assert!(matches!(err, TopologyError::Parse { line: 3, .. }));
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(parse(""), Err(TopologyError::Parse { .. })));
        assert!(matches!(parse("3\n"), Err(TopologyError::Parse { .. })));
        assert!(matches!(parse("three\n0\n"), Err(TopologyError::Parse { line: 1, .. })));
    }

    #[test]
    fn rejects_vertex_count_above_limit_before_allocating() {
        assert!(matches!(
            parse("4294967295\n0\n"),
            Err(TopologyError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse(&format!("{}\n0\n", DEFAULT_VERTEX_LIMIT + 1)),
            Err(TopologyError::Parse { .. })
        ));
        assert!(matches!(
            parse("99999999999999999999\n0\n"),
            Err(TopologyError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn custom_vertex_limit() {
        assert_eq!(parse_with_limit("4\n1\n0 3\n", 4).unwrap().vertex_count(), 4);
        assert!(matches!(
            parse_with_limit("5\n1\n0 3\n", 4),
            Err(TopologyError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_edge_count_mismatch() {
        let err = parse("3\n2\n0 1\n").unwrap_err();
        assert!(matches!(
            err,
            TopologyError::EdgeCountMismatch { declared: 2, found: 1 }
        ));
    }

    #[test]
    fn render_then_parse_preserves_edges() {
        let g = Graph::from_edges(5, [(3, 1), (0, 4), (2, 3)]).unwrap();
        let back = parse(&render(&g)).unwrap();
        let mut a: Vec<_> = g.edges().collect();
        let mut b: Vec<_> = back.edges().collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn read_and_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ring.txt");
        let g = crate::generate::ring(5);

        write(&path, &g).unwrap();
        let loaded = read(&path).unwrap();
        assert_eq!(loaded.edge_count(), 5);

        assert!(matches!(read_with_limit(&path, 4), Err(TopologyError::Parse { .. })));

        let missing = read(dir.path().join("missing.txt"));
        assert!(matches!(missing, Err(TopologyError::Io(_))));
    }
}
