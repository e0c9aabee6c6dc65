//! Ranking presenters implementing ReportPort.

use crate::domain::error::QmoneyError;
use crate::domain::ranking::RankingResult;
use crate::domain::returns::AnnualizedReturn;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::io::Write;

/// Fixed-width table for terminals.
pub struct TextReportAdapter;

impl ReportPort for TextReportAdapter {
    fn write(&self, result: &RankingResult, out: &mut dyn Write) -> Result<(), QmoneyError> {
        let width = result
            .returns
            .iter()
            .map(|r| r.symbol.len())
            .chain(result.failures.iter().map(|f| f.symbol.len()))
            .max()
            .unwrap_or(0)
            .max("Symbol".len());

        if result.returns.is_empty() {
            writeln!(out, "No trades ranked.")?;
        } else {
            writeln!(
                out,
                "{:>4}  {:<width$}  {:>11}  {:>11}",
                "Rank", "Symbol", "Annualized", "Total"
            )?;
            for (i, r) in result.returns.iter().enumerate() {
                writeln!(
                    out,
                    "{:>4}  {:<width$}  {:>10.2}%  {:>10.2}%",
                    i + 1,
                    r.symbol,
                    r.annualized_return * 100.0,
                    r.total_return * 100.0
                )?;
            }
        }

        if !result.failures.is_empty() {
            writeln!(out, "\nFailed ({}):", result.failures.len())?;
            for f in &result.failures {
                writeln!(out, "  {:<width$}  [{}] {}", f.symbol, f.stage, f.error)?;
            }
        }
        Ok(())
    }
}

/// Pretty-printed JSON with a `returns` array and a `failures` array.
pub struct JsonReportAdapter;

#[derive(Serialize)]
struct JsonReport<'a> {
    returns: &'a [AnnualizedReturn],
    failures: Vec<JsonFailure<'a>>,
}

#[derive(Serialize)]
struct JsonFailure<'a> {
    symbol: &'a str,
    stage: String,
    error: String,
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &RankingResult, out: &mut dyn Write) -> Result<(), QmoneyError> {
        let report = JsonReport {
            returns: &result.returns,
            failures: result
                .failures
                .iter()
                .map(|f| JsonFailure {
                    symbol: &f.symbol,
                    stage: f.stage.to_string(),
                    error: f.error.to_string(),
                })
                .collect(),
        };
        serde_json::to_writer_pretty(&mut *out, &report).map_err(std::io::Error::other)?;
        writeln!(out)?;
        Ok(())
    }
}
