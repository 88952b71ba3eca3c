//! GWT text file writer (§6), a line-oriented weights export format.
//!
//! Carries over the original's `write_gwt` id-vector validation (§B):
//! rejects an `id_vec` whose length doesn't match the graph's observation
//! count, and rejects empty layer/variable names, before writing anything.

use std::io::{self, Write};

use crate::error::GdaError;
use crate::graph::WeightedGraph;

/// Writes `graph` in GWT format to `out`:
///
/// ```text
/// 0 <num_obs> <layer_name> <variable_name>
/// <id_i> <id_j> <weight>
/// ...
/// ```
///
/// `id_vec` supplies the external id printed for each observation index (the
/// original format prints caller-assigned ids, not raw 0-based indices).
pub fn write_gwt<W: Write>(
    out: &mut W,
    graph: &WeightedGraph,
    id_vec: &[i64],
    layer_name: &str,
    variable_name: &str,
) -> Result<(), GdaError> {
    if id_vec.len() != graph.num_obs() {
        return Err(GdaError::LengthMismatch {
            left: id_vec.len(),
            right: graph.num_obs(),
        });
    }
    if layer_name.trim().is_empty() || variable_name.trim().is_empty() {
        return Err(GdaError::EmptyInput);
    }

    let quoted_layer = if layer_name.contains(' ') {
        format!("\"{layer_name}\"")
    } else {
        layer_name.to_string()
    };

    write_io(writeln!(
        out,
        "0 {} {} {}",
        graph.num_obs(),
        quoted_layer,
        variable_name
    ))?;

    for i in 0..graph.num_obs() {
        for n in graph.weighted_neighbors(i) {
            write_io(writeln!(out, "{} {} {:.9}", id_vec[i], id_vec[n.index], n.weight))?;
        }
    }
    Ok(())
}

fn write_io(result: io::Result<()>) -> Result<(), GdaError> {
    result.map_err(|e| GdaError::WriteFailure { message: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WeightedNeighbor;

    #[test]
    fn header_and_body_match_format() {
        let g = WeightedGraph::new(vec![
            vec![WeightedNeighbor { index: 1, weight: 0.5 }],
            vec![WeightedNeighbor { index: 0, weight: 0.5 }],
        ]);
        let mut buf = Vec::new();
        write_gwt(&mut buf, &g, &[100, 101], "my layer", "INCOME").unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "0 2 \"my layer\" INCOME");
        assert_eq!(lines.next().unwrap(), "100 101 0.500000000");
        assert_eq!(lines.next().unwrap(), "101 100 0.500000000");
    }

    #[test]
    fn mismatched_id_vec_length_is_rejected() {
        let g = WeightedGraph::new(vec![vec![], vec![]]);
        let mut buf = Vec::new();
        let err = write_gwt(&mut buf, &g, &[1], "l", "v").unwrap_err();
        assert_eq!(err, GdaError::LengthMismatch { left: 1, right: 2 });
    }

    #[test]
    fn empty_names_are_rejected() {
        let g = WeightedGraph::new(vec![vec![]]);
        let mut buf = Vec::new();
        assert_eq!(write_gwt(&mut buf, &g, &[1], "", "v").unwrap_err(), GdaError::EmptyInput);
    }
}
