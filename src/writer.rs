use rust_htslib::bgzf;
use std::io::Write;

use crate::error::Result;
use crate::rows::OutputRow;

/// Header line of the frequency table.
pub const HEADER: &str = "SNP\tCHR\tREF\tALT\tAF_ref";

/// `EitherWriter` is where the table goes: stdout for `-`, a BGZF file when
/// the path ends in `.gz`, and a plain text file otherwise.
pub enum EitherWriter {
    Bgzf(bgzf::Writer),
    File(std::io::BufWriter<std::fs::File>),
    Stdout(std::io::BufWriter<std::io::Stdout>),
}

impl EitherWriter {
    /// Open `path` for writing, truncating anything already there.
    pub fn from_path(path: &str) -> Result<Self> {
        Ok(if path == "-" {
            EitherWriter::Stdout(std::io::BufWriter::new(std::io::stdout()))
        } else if path.ends_with(".gz") {
            EitherWriter::Bgzf(bgzf::Writer::from_path(path)?)
        } else {
            let file = std::fs::File::create(path)?;
            EitherWriter::File(std::io::BufWriter::new(file))
        })
    }
}

impl Write for EitherWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            EitherWriter::Bgzf(w) => w.write(buf),
            EitherWriter::File(w) => w.write(buf),
            EitherWriter::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            EitherWriter::Bgzf(w) => w.flush(),
            EitherWriter::File(w) => w.flush(),
            EitherWriter::Stdout(w) => w.flush(),
        }
    }
}

/// Writes the tab-separated frequency table: the header once, then rows in
/// the order they are given. Rows are never reordered or deduplicated.
pub struct FrequencyTableWriter<W: Write> {
    inner: W,
    rows_written: usize,
}

impl<W: Write> FrequencyTableWriter<W> {
    /// Wrap `inner` and write the header line.
    pub fn new(mut inner: W) -> std::io::Result<Self> {
        writeln!(inner, "{}", HEADER)?;
        Ok(FrequencyTableWriter {
            inner,
            rows_written: 0,
        })
    }

    pub fn write_row(&mut self, row: &OutputRow) -> std::io::Result<()> {
        writeln!(
            self.inner,
            "{}\t{}\t{}\t{}\t{}",
            row.snp_id,
            row.chrom,
            row.ref_allele,
            row.alt,
            format_frequency(row.af)
        )?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Shortest text that parses back to `af`, always carrying a fractional part
/// or an exponent: decimal for magnitudes in [1e-4, 1e16), otherwise
/// exponent notation with a signed exponent of at least two digits
/// (`0.05`, `1.0`, `1e-05`, `2.5e+16`).
pub fn format_frequency(af: f64) -> String {
    let s = format!("{:?}", af);
    match s.split_once('e') {
        None => s,
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
    }
}
