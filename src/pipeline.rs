use rust_htslib::bgzf;
use rust_htslib::tpool::ThreadPool;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::files;
use crate::frequency::PopulationKey;
use crate::rows::{MalformedPolicy, Rows, SkipCounts};
use crate::writer::{EitherWriter, FrequencyTableWriter};

/// Everything a run needs, as gathered from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub key: PopulationKey,
    pub input_dir: PathBuf,
    /// Output path; `-` is stdout.
    pub output: String,
    /// htslib decompression threads. 1 or fewer means no thread pool.
    pub threads: u32,
    pub malformed: MalformedPolicy,
}

/// Extractor drives a run: every input file in order, each line through
/// [`Rows`], every accepted row into a single table writer.
pub struct Extractor {
    config: Config,
    pool: Option<ThreadPool>,
}

impl Extractor {
    pub fn new(config: Config) -> Result<Self> {
        let pool = if config.threads > 1 {
            Some(ThreadPool::new(config.threads)?)
        } else {
            None
        };
        Ok(Extractor { config, pool })
    }

    /// Write the table for every `*.vcf.gz` in the input directory to the
    /// configured output and return the accumulated counts.
    pub fn run(&self) -> Result<SkipCounts> {
        let out = EitherWriter::from_path(&self.config.output)?;
        let counts = self.write_to(out)?;
        log::info!("wrote {} to {}", counts, self.config.output);
        Ok(counts)
    }

    /// Like [`Extractor::run`] but into any writer. Files are processed
    /// strictly one after another so rows come out in file order, then line
    /// order.
    pub fn write_to<W: Write>(&self, out: W) -> Result<SkipCounts> {
        let paths = files::vcf_files(&self.config.input_dir)?;
        if paths.is_empty() {
            log::warn!(
                "no *{} files found in {}",
                files::VCF_GZ_SUFFIX,
                self.config.input_dir.display()
            );
        }

        let mut table = FrequencyTableWriter::new(out)?;
        let mut total = SkipCounts::default();
        for path in &paths {
            total += self.process_file(path, &mut table)?;
        }
        table.finish()?;
        Ok(total)
    }

    fn process_file<W: Write>(
        &self,
        path: &Path,
        table: &mut FrequencyTableWriter<W>,
    ) -> Result<SkipCounts> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        log::info!("Processing {} ...", name);

        let lines = self.open(path)?.lines();
        let mut rows = Rows::new(lines, &self.config.key, self.config.malformed, path);
        for row in rows.by_ref() {
            table.write_row(&row?)?;
        }
        let counts = rows.counts();
        log::info!("{}: {}", name, counts);
        Ok(counts)
    }

    fn open(&self, path: &Path) -> Result<BufReader<bgzf::Reader>> {
        let mut reader = bgzf::Reader::from_path(path)?;
        if let Some(pool) = &self.pool {
            reader.set_thread_pool(pool)?;
        }
        Ok(BufReader::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const HEADER_LINES: &str = "##fileformat=VCFv4.1\n\
        ##INFO=<ID=AF,Number=A,Type=Float,Description=\"Estimated allele frequency\">\n\
        #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

    fn write_vcf_gz(dir: &Path, name: &str, body: &str) {
        let mut wtr = bgzf::Writer::from_path(dir.join(name)).expect("error creating bgzf file");
        wtr.write_all(HEADER_LINES.as_bytes()).unwrap();
        wtr.write_all(body.as_bytes()).unwrap();
        wtr.flush().unwrap();
    }

    fn config(pop: &str, dir: &Path) -> Config {
        Config {
            key: PopulationKey::new(pop).unwrap(),
            input_dir: dir.to_path_buf(),
            output: "-".to_string(),
            threads: 1,
            malformed: MalformedPolicy::Abort,
        }
    }

    fn run_to_string(config: Config) -> (String, SkipCounts) {
        let extractor = Extractor::new(config).unwrap();
        let mut out = Vec::new();
        let counts = extractor.write_to(&mut out).unwrap();
        (String::from_utf8(out).unwrap(), counts)
    }

    fn populate(dir: &Path) {
        write_vcf_gz(
            dir,
            "chr2.vcf.gz",
            "2\t20000\trs123\tG\tC,T\t.\t.\tAF=0.2\n\
             2\t20500\trs200\tC\tG\t.\tPASS\tAF=0.3;EUR_AF=0.25;AFR_AF=1e-05\n",
        );
        write_vcf_gz(
            dir,
            "chr1.vcf.gz",
            "1\t10000\t.\tA\tT\t.\t.\tAF=0.1;EUR_AF=0.05\n\
             3\t30000\trs456\tA\tG\t.\t.\tDP=30\n\
             1\t10100\trs200\tT\tC\t.\t.\tEUR_AF=1;AF=0.5\n",
        );
        std::fs::write(dir.join("notes.txt"), "not a vcf").unwrap();
    }

    #[test]
    fn test_population_rows_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());

        let (out, counts) = run_to_string(config("EUR", dir.path()));
        assert_eq!(
            out,
            "SNP\tCHR\tREF\tALT\tAF_ref\n\
             1:10000:A:T\t1\tA\tT\t0.05\n\
             rs200\t1\tT\tC\t1.0\n\
             rs200\t2\tC\tG\t0.25\n"
        );
        assert_eq!(counts.emitted, 3);
        assert_eq!(counts.multiallelic, 1);
        assert_eq!(counts.no_frequency, 1);
    }

    #[test]
    fn test_pooled_population() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());

        let (out, _) = run_to_string(config("ALL", dir.path()));
        assert_eq!(
            out,
            "SNP\tCHR\tREF\tALT\tAF_ref\n\
             1:10000:A:T\t1\tA\tT\t0.1\n\
             rs200\t1\tT\tC\t0.5\n\
             rs200\t2\tC\tG\t0.3\n"
        );

        let (out, _) = run_to_string(config("AFR", dir.path()));
        assert_eq!(out, "SNP\tCHR\tREF\tALT\tAF_ref\nrs200\t2\tC\tG\t1e-05\n");
    }

    #[test]
    fn test_reruns_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());

        let (first, _) = run_to_string(config("EUR", dir.path()));
        let (second, _) = run_to_string(config("EUR", dir.path()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_dir_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let (out, counts) = run_to_string(config("EUR", dir.path()));
        assert_eq!(out, "SNP\tCHR\tREF\tALT\tAF_ref\n");
        assert_eq!(counts, SkipCounts::default());
    }

    #[test]
    fn test_malformed_aborts_by_default() {
        let dir = tempfile::tempdir().unwrap();
        write_vcf_gz(
            dir.path(),
            "chr1.vcf.gz",
            "1\t10000\t.\tA\tT\t.\t.\tAF=0.1\n1\t10001\t.\tA\n",
        );

        let extractor = Extractor::new(config("ALL", dir.path())).unwrap();
        let mut out = Vec::new();
        match extractor.write_to(&mut out) {
            Err(Error::MalformedRecord { path, line, fields }) => {
                assert_eq!(path, dir.path().join("chr1.vcf.gz"));
                // three header lines precede the data
                assert_eq!(line, 5);
                assert_eq!(fields, 4);
            }
            other => panic!("expected malformed record error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_skipped_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        write_vcf_gz(
            dir.path(),
            "chr1.vcf.gz",
            "1\t10000\t.\tA\tT\t.\t.\tAF=0.1\n1\t10001\t.\tA\n1\t10002\t.\tG\tC\t.\t.\tAF=0.2\n",
        );

        let mut cfg = config("ALL", dir.path());
        cfg.malformed = MalformedPolicy::Skip;
        let (out, counts) = run_to_string(cfg);
        assert_eq!(
            out,
            "SNP\tCHR\tREF\tALT\tAF_ref\n\
             1:10000:A:T\t1\tA\tT\t0.1\n\
             1:10002:G:C\t1\tG\tC\t0.2\n"
        );
        assert_eq!(counts.malformed, 1);
    }

    #[test]
    fn test_unreadable_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.vcf.gz"), b"\x1f\x8b\x08not really gzip").unwrap();

        let extractor = Extractor::new(config("ALL", dir.path())).unwrap();
        let mut out = Vec::new();
        assert!(extractor.write_to(&mut out).is_err());
    }

    #[test]
    fn test_run_with_thread_pool_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vcfs");
        std::fs::create_dir(&input).unwrap();
        populate(&input);
        let output = dir.path().join("af_EUR.tsv");

        let mut cfg = config("EUR", &input);
        cfg.output = output.to_str().unwrap().to_string();
        cfg.threads = 2;
        let counts = Extractor::new(cfg).unwrap().run().unwrap();
        assert_eq!(counts.emitted, 3);

        let text = std::fs::read_to_string(&output).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("SNP\tCHR\tREF\tALT\tAF_ref"));
        for line in lines {
            let cols: Vec<&str> = line.split('\t').collect();
            assert_eq!(cols.len(), 5);
            assert!(!cols[3].contains(','));
            assert!(cols[4].parse::<f64>().unwrap().is_finite());
        }
    }
}
