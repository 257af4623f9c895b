//! Turn the lines of one VCF into output rows.
//!
//! Everything here is independent of where lines come from and where rows go:
//! [`decide`] classifies a single line, and [`Rows`] lazily applies it over an
//! ordered line source while counting what was skipped and why.

use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::frequency::{self, Lookup, PopulationKey};
use crate::variant::{ParsedLine, VariantLine};

/// One row of the frequency table.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub snp_id: String,
    pub chrom: String,
    pub ref_allele: String,
    pub alt: String,
    pub af: f64,
}

/// The fate of a single input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Accepted(OutputRow),
    SkippedMultiallelic,
    SkippedNoFrequency,
    SkippedUnparsable,
    /// Comment or blank line; not a record at all.
    Ignored,
    Malformed { fields: usize },
}

/// Run one line through parsing, the biallelic filter, frequency lookup and
/// ID resolution.
pub fn decide(line: &str, key: &PopulationKey) -> Decision {
    let variant = match VariantLine::parse(line) {
        ParsedLine::Ignored => return Decision::Ignored,
        ParsedLine::Malformed { fields } => return Decision::Malformed { fields },
        ParsedLine::Record(v) => v,
    };
    if !variant.is_biallelic() {
        return Decision::SkippedMultiallelic;
    }
    let af = match frequency::extract(variant.info, key) {
        Lookup::Found(annotation) => annotation.value,
        Lookup::Missing => return Decision::SkippedNoFrequency,
        Lookup::Unparsable(_) => return Decision::SkippedUnparsable,
    };
    Decision::Accepted(OutputRow {
        snp_id: variant.snp_id().into_owned(),
        chrom: variant.chrom.to_string(),
        ref_allele: variant.ref_allele.to_string(),
        alt: variant.alt.to_string(),
        af,
    })
}

/// What to do with a data line that has fewer than eight columns. The same
/// policy applies to every line of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Stop the run with [`Error::MalformedRecord`].
    #[default]
    Abort,
    /// Warn, count the line and keep going.
    Skip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub emitted: usize,
    pub multiallelic: usize,
    pub no_frequency: usize,
    pub unparsable: usize,
    pub malformed: usize,
}

impl SkipCounts {
    pub fn record(&mut self, decision: &Decision) {
        match decision {
            Decision::Accepted(_) => self.emitted += 1,
            Decision::SkippedMultiallelic => self.multiallelic += 1,
            Decision::SkippedNoFrequency => self.no_frequency += 1,
            Decision::SkippedUnparsable => self.unparsable += 1,
            Decision::Malformed { .. } => self.malformed += 1,
            Decision::Ignored => {}
        }
    }

    pub fn skipped(&self) -> usize {
        self.multiallelic + self.no_frequency + self.unparsable + self.malformed
    }
}

impl AddAssign for SkipCounts {
    fn add_assign(&mut self, other: Self) {
        self.emitted += other.emitted;
        self.multiallelic += other.multiallelic;
        self.no_frequency += other.no_frequency;
        self.unparsable += other.unparsable;
        self.malformed += other.malformed;
    }
}

impl fmt::Display for SkipCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} emitted, {} skipped (multiallelic: {}, no frequency: {}, unparsable: {}, malformed: {})",
            self.emitted,
            self.skipped(),
            self.multiallelic,
            self.no_frequency,
            self.unparsable,
            self.malformed
        )
    }
}

/// Lazily yields the accepted rows of one input, in line order.
///
/// `source` only labels error and warning messages. Read errors and (under
/// [`MalformedPolicy::Abort`]) malformed lines are yielded as errors; the
/// caller is expected to stop at the first one.
pub struct Rows<'k, I> {
    lines: I,
    key: &'k PopulationKey,
    policy: MalformedPolicy,
    source: PathBuf,
    line_number: usize,
    counts: SkipCounts,
}

impl<'k, I> Rows<'k, I>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    pub fn new<P: Into<PathBuf>>(
        lines: I,
        key: &'k PopulationKey,
        policy: MalformedPolicy,
        source: P,
    ) -> Self {
        Rows {
            lines,
            key,
            policy,
            source: source.into(),
            line_number: 0,
            counts: SkipCounts::default(),
        }
    }

    /// Counts for the lines consumed so far.
    pub fn counts(&self) -> SkipCounts {
        self.counts
    }
}

impl<I> Iterator for Rows<'_, I>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    type Item = Result<OutputRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;

            let decision = decide(&line, self.key);
            if let Decision::Malformed { fields } = decision {
                if self.policy == MalformedPolicy::Abort {
                    return Some(Err(Error::MalformedRecord {
                        path: self.source.clone(),
                        line: self.line_number,
                        fields,
                    }));
                }
                log::warn!(
                    "{}:{}: skipping malformed record with {} field(s)",
                    self.source.display(),
                    self.line_number,
                    fields
                );
            }
            self.counts.record(&decision);
            if let Decision::Accepted(row) = decision {
                return Some(Ok(row));
            }
        }
    }
}
