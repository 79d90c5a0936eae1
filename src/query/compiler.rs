//! Group-query compilation
//!
//! Translates a [`GroupQuery`] into two parallel expression programs: an
//! export program producing per-step raw samples and a graph-info program
//! producing summary statistics and percentiles. Each compilation owns a
//! private identifier namespace (`serie<N>`, `serie<N>-tmp<i>`, ...), so
//! concurrent queries against the same catalog cannot collide.

use crate::catalog::{MetricCatalog, MetricDescriptor};
use crate::engine::{Expr, Program, SummaryStat};
use crate::error::QueryError;
use crate::types::{GroupOperator, GroupQuery, SeriesRef};
use std::collections::HashMap;
use tracing::debug;

/// Output of one compilation
#[derive(Debug, Clone, Default)]
pub struct CompiledQuery {
    /// Export program (raw samples); empty when samples were not requested
    pub export: Program,

    /// Graph-info program (summary statistics and percentiles)
    pub graph: Program,

    /// Temporary identifier to series/group label
    pub labels: HashMap<String, String>,
}

/// Aggregation collapse rule
///
/// Aggregating fewer than two series is the identity, and the collapse
/// also moves labeling from the group name back to the per-series names,
/// so it must happen before any identifier is allocated.
fn effective_operator(operator: GroupOperator, resolvable: usize) -> GroupOperator {
    if resolvable < 2 {
        GroupOperator::None
    } else {
        operator
    }
}

/// Compile a group query against a catalog snapshot
///
/// Unresolved series references are skipped; they contribute neither
/// identifiers nor output labels. `with_export` controls whether the
/// export program is populated (statistics-only calls leave it empty).
pub fn compile(
    query: &GroupQuery,
    catalog: &MetricCatalog,
    percentiles: &[f64],
    with_export: bool,
) -> Result<CompiledQuery, QueryError> {
    if query.series.is_empty() {
        return Err(QueryError::EmptyGroup);
    }

    let resolved: Vec<(&SeriesRef, &MetricDescriptor)> = query
        .series
        .iter()
        .filter_map(|series| {
            let metric = series.metric.as_deref()?;
            catalog
                .resolve(&series.source, metric)
                .map(|descriptor| (series, descriptor))
        })
        .collect();

    let operator = effective_operator(query.operator, resolved.len());
    debug!(
        group = %query.name,
        series = query.series.len(),
        resolved = resolved.len(),
        ?operator,
        "compiling group query"
    );

    let mut compiled = CompiledQuery::default();

    match operator {
        GroupOperator::None => compile_plain(query, &resolved, percentiles, with_export, &mut compiled),
        GroupOperator::Sum | GroupOperator::Avg => {
            compile_aggregate(query, &resolved, operator, percentiles, with_export, &mut compiled)
        }
    }

    Ok(compiled)
}

/// One independent identifier chain per series
fn compile_plain(
    query: &GroupQuery,
    resolved: &[(&SeriesRef, &MetricDescriptor)],
    percentiles: &[f64],
    with_export: bool,
    compiled: &mut CompiledQuery,
) {
    for (count, &(series, descriptor)) in resolved.iter().enumerate() {
        let temp = format!("serie{}", count);

        define_scaled_chain(&mut compiled.graph, &temp, series, descriptor, query.scale);
        push_statistics(&mut compiled.graph, &temp, &series.name, percentiles);

        if with_export {
            define_scaled_chain(&mut compiled.export, &temp, series, descriptor, query.scale);
            compiled.export.xport(&temp, &temp);
        }

        compiled.labels.insert(temp, series.name.clone());
    }
}

/// Raw dataset sample, optional per-series scale, optional group scale
fn define_scaled_chain(
    program: &mut Program,
    temp: &str,
    series: &SeriesRef,
    descriptor: &MetricDescriptor,
    group_scale: f64,
) {
    let orig0 = format!("{}-orig0", temp);
    let orig1 = format!("{}-orig1", temp);

    program.def(&orig0, &descriptor.archive_path, &descriptor.dataset);

    let scaled = if series.scale != 0.0 {
        Expr::reference(&orig0).scaled(series.scale)
    } else {
        Expr::reference(&orig0)
    };
    program.cdef(&orig1, scaled);

    let grouped = if group_scale != 0.0 {
        Expr::reference(&orig1).scaled(group_scale)
    } else {
        Expr::reference(&orig1)
    };
    program.cdef(temp, grouped);
}

/// One shared identifier combining every resolvable series
///
/// Every operand substitutes unknown readings with zero before entering
/// the accumulation, so a single missing sample cannot turn an entire
/// aggregate row unknown.
fn compile_aggregate(
    query: &GroupQuery,
    resolved: &[(&SeriesRef, &MetricDescriptor)],
    operator: GroupOperator,
    percentiles: &[f64],
    with_export: bool,
    compiled: &mut CompiledQuery,
) {
    let shared = "serie0".to_string();
    let mut operands = Vec::with_capacity(resolved.len());

    for (index, &(_, descriptor)) in resolved.iter().enumerate() {
        let temp = format!("{}-tmp{}", shared, index);
        let ori = format!("{}-ori", temp);

        compiled.graph.def(&ori, &descriptor.archive_path, &descriptor.dataset);
        compiled.graph.cdef(&temp, Expr::zero_if_unknown(&ori));

        if with_export {
            compiled.export.def(&ori, &descriptor.archive_path, &descriptor.dataset);
            compiled.export.cdef(&temp, Expr::zero_if_unknown(&ori));
        }

        operands.push(Expr::reference(&temp));
    }

    // The collapse rule guarantees at least two operands here.
    let mut combined = Expr::sum(operands).expect("aggregate over resolved series");
    if operator == GroupOperator::Avg {
        combined = combined.divided_by(resolved.len());
    }

    let orig = format!("{}-orig", shared);
    compiled.graph.cdef(&orig, combined.clone());
    apply_group_scale(&mut compiled.graph, &shared, &orig, query.scale);
    push_statistics(&mut compiled.graph, &shared, &query.name, percentiles);

    if with_export {
        compiled.export.cdef(&orig, combined);
        apply_group_scale(&mut compiled.export, &shared, &orig, query.scale);
        compiled.export.xport(&shared, &shared);
    }

    compiled.labels.insert(shared, query.name.clone());
}

fn apply_group_scale(program: &mut Program, id: &str, orig: &str, scale: f64) {
    let expr = if scale != 0.0 {
        Expr::reference(orig).scaled(scale)
    } else {
        Expr::reference(orig)
    };
    program.cdef(id, expr);
}

/// Statistics block: min/avg/max/last plus one percentile request per rank
///
/// Percentiles run over a derived identifier with unknowns zeroed. Keys
/// render as `<p>th`, using two decimals when the rank is fractional
/// (99.9 becomes `99.90th`) and none otherwise (95 becomes `95th`).
fn push_statistics(graph: &mut Program, id: &str, label: &str, percentiles: &[f64]) {
    for (suffix, stat, key) in [
        ("min", SummaryStat::Minimum, "min"),
        ("avg", SummaryStat::Average, "avg"),
        ("max", SummaryStat::Maximum, "max"),
        ("last", SummaryStat::Last, "last"),
    ] {
        let stat_id = format!("{}-{}", id, suffix);
        graph.vdef(&stat_id, id, stat);
        graph.print(&stat_id, format!("{},{},%lf", label, key));
    }

    for (index, &rank) in percentiles.iter().enumerate() {
        let cdef_id = format!("{}-cdef{}", id, index);
        let vdef_id = format!("{}-vdef{}", id, index);

        graph.cdef(&cdef_id, Expr::zero_if_unknown(id));
        graph.vdef(&vdef_id, &cdef_id, SummaryStat::Percentile(rank));

        let key = if rank.fract() != 0.0 {
            format!("{:.2}th", rank)
        } else {
            format!("{:.0}th", rank)
        };
        graph.print(&vdef_id, format!("{},{},%lf", label, key));
    }
}
