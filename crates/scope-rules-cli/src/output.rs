//! Helpers for rendering command output.

use std::io::Write;

use eyre::{Context, Result};
use scope_rules::{Activity, Catalog, ClauseDetail, Explanation, TagKind};
use serde::Serialize;

pub(crate) fn write_line(writer: &mut dyn Write, line: &str) -> Result<()> {
    writeln!(writer, "{line}").wrap_err("failed to write output line")
}

pub(crate) fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).wrap_err("failed to serialise JSON output")?;
    writeln!(writer).wrap_err("failed to terminate JSON output with newline")
}

/// Renders an explanation as one block per clause.
///
/// ```text
/// no match (1 of 2 clauses matched)
///   + scope.has("a")
///       matched: Alpha
///   &&
///   - scope.has("b")
///       missing: b
/// ```
pub(crate) fn write_explanation(
    writer: &mut dyn Write,
    explanation: &Explanation,
    catalog: Option<&Catalog>,
) -> Result<()> {
    let verdict = if explanation.matches { "match" } else { "no match" };
    writeln!(
        writer,
        "{verdict} ({} of {} clauses matched)",
        explanation.matched_clause_count(),
        explanation.clauses.len()
    )
    .wrap_err("failed to write explanation summary")?;
    for clause in &explanation.clauses {
        write_clause(writer, clause, catalog)?;
    }
    Ok(())
}

fn write_clause(
    writer: &mut dyn Write,
    clause: &ClauseDetail,
    catalog: Option<&Catalog>,
) -> Result<()> {
    let mark = if clause.matches { '+' } else { '-' };
    writeln!(writer, "  {mark} {}", clause.source)
        .wrap_err_with(|| format!("failed to write clause {}", clause.source))?;
    write_key_list(writer, "matched", &clause.matched_tags, catalog)?;
    write_key_list(writer, "missing", &clause.missing_tags, catalog)?;
    if let Some(joiner) = clause.joiner {
        writeln!(writer, "  {joiner}").wrap_err("failed to write clause joiner")?;
    }
    Ok(())
}

fn write_key_list(
    writer: &mut dyn Write,
    heading: &str,
    keys: &[String],
    catalog: Option<&Catalog>,
) -> Result<()> {
    if keys.is_empty() {
        return Ok(());
    }
    let labels: Vec<&str> = keys.iter().map(|key| label(catalog, key)).collect();
    writeln!(writer, "      {heading}: {}", labels.join(", "))
        .wrap_err_with(|| format!("failed to write {heading} keys"))
}

fn label<'a>(catalog: Option<&'a Catalog>, key: &'a str) -> &'a str {
    catalog.map_or(key, |catalog| catalog.label_for(key))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterReport<'a> {
    total: usize,
    matched: &'a [&'a Activity],
}

pub(crate) fn write_filter_report(
    writer: &mut dyn Write,
    matched: &[&Activity],
    total: usize,
    json: bool,
) -> Result<()> {
    if json {
        return write_json(writer, &FilterReport { total, matched });
    }
    for activity in matched {
        writeln!(writer, "{}", activity.title)
            .wrap_err_with(|| format!("failed to write activity {}", activity.title))?;
    }
    writeln!(writer, "{} of {total} activities match", matched.len())
        .wrap_err("failed to write filter summary")
}

pub(crate) fn write_frequency(
    writer: &mut dyn Write,
    frequency: &[(String, usize)],
    catalog: Option<&Catalog>,
) -> Result<()> {
    writeln!(writer, "tag frequency:").wrap_err("failed to write frequency heading")?;
    let width = frequency
        .iter()
        .map(|(key, _)| label(catalog, key).len())
        .max()
        .unwrap_or(0);
    for (key, count) in frequency {
        writeln!(writer, "  {:<width$}  {count}", label(catalog, key))
            .wrap_err_with(|| format!("failed to write frequency for {key}"))?;
    }
    Ok(())
}

pub(crate) fn write_distribution(
    writer: &mut dyn Write,
    distribution: &[(TagKind, usize)],
) -> Result<()> {
    writeln!(writer, "kind distribution:").wrap_err("failed to write distribution heading")?;
    for (kind, count) in distribution {
        writeln!(writer, "  {:<10}  {count}", kind.as_str())
            .wrap_err_with(|| format!("failed to write distribution for {kind}"))?;
    }
    Ok(())
}
