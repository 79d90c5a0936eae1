//! Result merging
//!
//! Reassembles the two raw engine results (the export table and the
//! printed statistic lines) into one [`PlotResult`] per logical series.
//! Merging is pure: the same raw inputs always produce the same output.

use crate::engine::ExportTable;
use crate::types::PlotResult;
use std::collections::HashMap;
use tracing::warn;

/// Merge raw engine results into per-label plot results
///
/// Export columns resolve their temporary identifier to the series/group
/// label through `labels`; statistic lines carry their label inline as
/// `label,key,value`. A label appearing only in statistics still yields a
/// result with an empty sample sequence. An unparsable statistic value
/// degrades to NaN instead of failing the query.
pub fn merge(
    table: Option<&ExportTable>,
    stat_lines: &[String],
    labels: &HashMap<String, String>,
) -> HashMap<String, PlotResult> {
    let mut results: HashMap<String, PlotResult> = HashMap::new();

    if let Some(table) = table {
        for (column, legend) in table.legends.iter().enumerate() {
            let label = labels.get(legend).cloned().unwrap_or_else(|| legend.clone());
            let entry = results.entry(label).or_default();
            for row in 0..table.row_count() {
                entry.samples.push(table.value_at(column, row));
            }
        }
    }

    for line in stat_lines {
        let mut parts = line.splitn(3, ',');
        let (Some(label), Some(key), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            warn!(line = %line, "malformed statistic line");
            continue;
        };

        let value = value.trim().parse::<f64>().unwrap_or(f64::NAN);
        results
            .entry(label.to_string())
            .or_default()
            .statistics
            .insert(key.to_string(), value);
    }

    results
}
