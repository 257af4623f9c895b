use std::borrow::Cow;

/// Number of fixed leading VCF columns: CHROM POS ID REF ALT QUAL FILTER INFO.
pub const FIXED_COLUMNS: usize = 8;

/// Placeholder used in the ID column when a site has no identifier.
pub const MISSING_ID: &str = ".";

/// The eight fixed columns of one VCF data line, borrowed from the line.
/// Sample columns after INFO are not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantLine<'a> {
    pub chrom: &'a str,
    pub pos: &'a str,
    pub id: &'a str,
    pub ref_allele: &'a str,
    pub alt: &'a str,
    pub qual: &'a str,
    pub filter: &'a str,
    pub info: &'a str,
}

/// What a single line of decompressed VCF text turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// `#` meta/header line, or a line with nothing but whitespace.
    Ignored,
    Record(VariantLine<'a>),
    /// Fewer than [`FIXED_COLUMNS`] tab-separated fields.
    Malformed { fields: usize },
}

impl<'a> VariantLine<'a> {
    /// Parse one line. The comment check looks at the raw line. Fields are
    /// split on tabs only after surrounding whitespace (including the line
    /// terminator) is trimmed.
    pub fn parse(line: &'a str) -> ParsedLine<'a> {
        if line.starts_with('#') {
            return ParsedLine::Ignored;
        }
        let line = line.trim();
        if line.is_empty() {
            return ParsedLine::Ignored;
        }

        let mut fields = line.splitn(FIXED_COLUMNS + 1, '\t');
        let mut cols = [""; FIXED_COLUMNS];
        for (i, col) in cols.iter_mut().enumerate() {
            match fields.next() {
                Some(f) => *col = f,
                None => return ParsedLine::Malformed { fields: i },
            }
        }
        let [chrom, pos, id, ref_allele, alt, qual, filter, info] = cols;
        ParsedLine::Record(VariantLine {
            chrom,
            pos,
            id,
            ref_allele,
            alt,
            qual,
            filter,
            info,
        })
    }

    /// A comma in ALT means more than one alternate allele.
    pub fn is_biallelic(&self) -> bool {
        !self.alt.contains(',')
    }

    /// The identifier written to the SNP column.
    pub fn snp_id(&self) -> Cow<'a, str> {
        resolve_id(self.id, self.chrom, self.pos, self.ref_allele, self.alt)
    }
}

/// Return `id` unless it is the `.` placeholder, in which case synthesize
/// `chrom:pos:ref:alt`.
pub fn resolve_id<'a>(
    id: &'a str,
    chrom: &str,
    pos: &str,
    ref_allele: &str,
    alt: &str,
) -> Cow<'a, str> {
    if id == MISSING_ID {
        Cow::Owned(format!("{}:{}:{}:{}", chrom, pos, ref_allele, alt))
    } else {
        Cow::Borrowed(id)
    }
}
