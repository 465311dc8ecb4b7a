use std::io::BufRead;

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::error::GcscanError::{EmptyClusterFileError, PosParseError};
use crate::structs::ClusterRecord;
use crate::utils::parse_phased_pair;

/// Sample identifiers start at this token on the header line, and per-sample
/// cluster-id pairs at the same token on every record line.
pub const FIRST_SAMPLE_TOKEN: usize = 3;

/// Forward-only reader over the `CHROM POS CM <samples..>` cluster stream
/// produced by the IBD clustering run.
pub struct ClusterReader<R: BufRead> {
    reader: R,
    buf: String,
    samples: Vec<String>,
}

impl<R: BufRead> ClusterReader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let mut buf = String::new();
        if reader.read_line(&mut buf)? == 0 {
            return Err(eyre!(EmptyClusterFileError));
        }

        let samples = buf
            .split_whitespace()
            .skip(FIRST_SAMPLE_TOKEN)
            .map(String::from)
            .collect();

        Ok(Self {
            reader,
            buf: String::new(),
            samples,
        })
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// The next cluster record, or `None` when the stream ends.
    pub fn next_record(&mut self) -> Result<Option<ClusterRecord>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            if self.buf.split_whitespace().next().is_none() {
                continue;
            }

            return parse_record_line(&self.buf).map(Some);
        }
    }
}

fn parse_record_line(line: &str) -> Result<ClusterRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let token = tokens.get(1).copied().unwrap_or_default();
    let pos = token
        .parse::<u64>()
        .map_err(|_| eyre!(PosParseError(token.into())))?;

    let pairs = &tokens[FIRST_SAMPLE_TOKEN.min(tokens.len())..];
    let n = pairs.len();
    let mut assignments = vec![0usize; 2 * n];
    for (i, token) in pairs.iter().enumerate() {
        let (a, b) = parse_phased_pair::<usize>(token, pos)?;
        assignments[i] = a;
        assignments[i + n] = b;
    }

    Ok(ClusterRecord { pos, assignments })
}

/// Two-slot synchronizer over the forward-only cluster stream.
///
/// The stream is advanced lazily, never further than the current variant
/// position requires, and freezes on its last record once the source is
/// exhausted.
pub struct ClusterSync<R: BufRead> {
    reader: ClusterReader<R>,
    previous: ClusterRecord,
    current: ClusterRecord,
    exhausted: bool,
}

impl<R: BufRead> ClusterSync<R> {
    pub fn new(mut reader: ClusterReader<R>) -> Result<Self> {
        let first = reader
            .next_record()?
            .ok_or_else(|| eyre!(EmptyClusterFileError))?;

        Ok(Self {
            reader,
            previous: first.clone(),
            current: first,
            exhausted: false,
        })
    }

    /// The record closest to `pos` among those inspected so far. Equidistant
    /// records resolve to the earlier one.
    ///
    /// Requires `pos` calls in increasing order; each underlying record is
    /// inspected once across a whole scan.
    pub fn nearest(&mut self, pos: u64) -> Result<&ClusterRecord> {
        while !self.exhausted && self.current.pos < pos {
            match self.reader.next_record()? {
                Some(record) => self.previous = std::mem::replace(&mut self.current, record),
                None => self.exhausted = true,
            }
        }

        match self.current.pos.abs_diff(pos) < self.previous.pos.abs_diff(pos) {
            true => Ok(&self.current),
            false => Ok(&self.previous),
        }
    }
}
