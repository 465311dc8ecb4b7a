use std::io::BufRead;

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::error::GcscanError::{MissingFieldError, NoSampleLineError, PosParseError};
use crate::structs::{SampleMap, VariantRecord};
use crate::utils::parse_phased_pair;

/// Sample identifiers start at this field on the `#CHROM` header line, and
/// per-sample genotypes at the same field on every data line.
pub const FIRST_SAMPLE_FIELD: usize = 9;

/// Forward-only reader over a line-oriented phased genotype stream.
///
/// Construction scans past the `##` metadata block to the header line that
/// carries the cohort's ordered sample identifiers. Genotypes are pulled out
/// of data lines through a [`SampleMap`], so every record is already in
/// cluster-stream sample order.
pub struct VcfReader<R: BufRead> {
    reader: R,
    buf: String,
    samples: Vec<String>,
}

impl<R: BufRead> VcfReader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let mut buf = String::new();

        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                return Err(eyre!(NoSampleLineError));
            }
            // ## marks metadata; the first line without it is the #CHROM line
            if buf.as_bytes().get(1) == Some(&b'#') || buf.split_whitespace().next().is_none() {
                continue;
            }

            let samples = buf
                .split_whitespace()
                .skip(FIRST_SAMPLE_FIELD)
                .map(String::from)
                .collect();

            return Ok(Self {
                reader,
                buf: String::new(),
                samples,
            });
        }
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// The next variant record, or `None` when the stream ends.
    pub fn next_record(&mut self, map: &SampleMap) -> Result<Option<VariantRecord>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            if self.buf.starts_with('#') || self.buf.split_whitespace().next().is_none() {
                continue;
            }

            return parse_data_line(&self.buf, map).map(Some);
        }
    }
}

fn parse_data_line(line: &str, map: &SampleMap) -> Result<VariantRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    let token = fields.get(1).copied().unwrap_or_default();
    let pos = token
        .parse::<u64>()
        .map_err(|_| eyre!(PosParseError(token.into())))?;

    let n = map.n_individuals();
    let mut alleles = vec![0u8; 2 * n];
    for (i, column) in map.columns().iter().enumerate() {
        let token = fields
            .get(*column)
            .ok_or_else(|| eyre!(MissingFieldError((pos, *column))))?;
        let (a, b) = parse_phased_pair::<u8>(token, pos)?;
        alleles[i] = a;
        alleles[i + n] = b;
    }

    Ok(VariantRecord { pos, alleles })
}
