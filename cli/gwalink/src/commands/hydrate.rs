//! `gwalink hydrate`: load a JSON-lines record file into a fresh session.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use gwalink_cache::{ConversionSession, HydrateSummary};
use gwalink_schema::{Keyword, Layer, NativeRecord};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

/// What a hydration run left in the cache.
#[derive(Debug, Serialize)]
pub struct HydrateReport {
    pub session: Uuid,
    pub layer: Layer,
    pub summary: HydrateSummary,
    pub rejected: Vec<Rejection>,
    pub keywords: Vec<KeywordCount>,
}

/// A line that could not be stored.
#[derive(Debug, Serialize)]
pub struct Rejection {
    /// One-based line number in the input file.
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct KeywordCount {
    pub keyword: Keyword,
    pub records: usize,
    pub provisional: usize,
}

pub fn run(input: &Path, layer: Layer, progress_every: usize, strict: bool, json: bool) -> Result<()> {
    let report = hydrate_file(input, layer, progress_every)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(input, &report);
    }

    if strict && !report.rejected.is_empty() {
        bail!(
            "{} record(s) rejected in {} (first at line {})",
            report.rejected.len(),
            input.display(),
            report.rejected[0].line
        );
    }
    Ok(())
}

/// Parse and hydrate `input`, collecting every rejected line.
pub(crate) fn hydrate_file(input: &Path, layer: Layer, progress_every: usize) -> Result<HydrateReport> {
    let content =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;

    let mut rejected = Vec::new();
    let mut lines = Vec::new();
    let mut records = Vec::new();
    for (i, raw) in content.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<NativeRecord>(trimmed) {
            Ok(record) => {
                lines.push(i + 1);
                records.push(record);
            }
            Err(e) => {
                warn!(line = i + 1, error = %e, "unreadable record");
                rejected.push(Rejection {
                    line: i + 1,
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut session = ConversionSession::new(layer);
    let on_progress = |p: gwalink_cache::HydrateProgress| {
        if progress_every > 0 {
            eprintln!("  {}/{} records ({} failed)", p.processed, p.total, p.failed);
        }
    };
    let summary = match session.hydrate(records, progress_every, on_progress) {
        Ok(summary) => summary,
        Err(errors) => {
            rejected.extend(errors.failures.into_iter().map(|f| Rejection {
                line: lines[f.position],
                reason: f.error.to_string(),
            }));
            errors.summary
        }
    };
    rejected.sort_by_key(|r| r.line);

    let keywords = keyword_counts(&session)?;
    Ok(HydrateReport {
        session: session.id(),
        layer,
        summary,
        rejected,
        keywords,
    })
}

/// Per-keyword counts, in the session's processing order. Keywords outside
/// the layer follow at the end.
fn keyword_counts(session: &ConversionSession) -> Result<Vec<KeywordCount>> {
    let mut order: Vec<Keyword> = session
        .generations()
        .context("ordering keywords")?
        .into_iter()
        .flatten()
        .collect();
    order.extend(Keyword::ALL.iter().filter(|kw| !kw.in_layer(session.layer())));

    let cache = &session.cache;
    Ok(order
        .into_iter()
        .map(|keyword| KeywordCount {
            keyword,
            records: cache.lookup_indices(keyword).len(),
            provisional: cache.provisional_count(keyword),
        })
        .filter(|c| c.records + c.provisional > 0)
        .collect())
}

fn print_report(input: &Path, report: &HydrateReport) {
    println!("Hydrated {} ({} layer)", input.display(), report.layer);
    println!("  session: {}", report.session);
    println!("  {}", report.summary);
    for count in &report.keywords {
        println!("  {:<16} {:>6}", count.keyword.as_str(), count.records);
    }
    for r in &report.rejected {
        println!("  line {}: {}", r.line, r.reason);
    }
}
