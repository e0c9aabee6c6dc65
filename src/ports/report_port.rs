//! Ranking presentation port trait.

use crate::domain::error::QmoneyError;
use crate::domain::ranking::RankingResult;
use std::io::Write;

/// Port for presenting a finished ranking.
pub trait ReportPort {
    fn write(&self, result: &RankingResult, out: &mut dyn Write) -> Result<(), QmoneyError>;
}
