use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::error::GcscanError::SampleNotFoundError;
use crate::read_vcf::FIRST_SAMPLE_FIELD;

/// One chromosomal copy held by an individual, `side` 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HapId {
    pub individual: usize,
    pub side: u8,
}

impl HapId {
    /// Haplotype indexes lay the side-0 block of the cohort before the
    /// side-1 block.
    pub fn from_index(index: usize, n_individuals: usize) -> Self {
        Self {
            individual: index % n_individuals,
            side: (index / n_individuals) as u8,
        }
    }
}

impl std::fmt::Display for HapId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.individual, self.side)
    }
}

/// A variant position with one allele code per haplotype, in haplotype-index
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub pos: u64,
    pub alleles: Vec<u8>,
}

/// A cluster assignment position with one cluster id per haplotype. Cluster
/// ids carry no meaning across positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRecord {
    pub pos: u64,
    pub assignments: Vec<usize>,
}

/// Per-cluster allele counts indexed by allele code, plus the cluster size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterTally {
    pub counts: Vec<usize>,
    pub size: usize,
}

/// Genotype-stream field index for every cluster-stream sample, built once
/// before any variant is processed. This mapping is the only correlation
/// trusted between the two streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMap {
    columns: Vec<usize>,
}

impl SampleMap {
    pub fn new(cluster_samples: &[String], vcf_samples: &[String]) -> Result<Self> {
        let columns = cluster_samples
            .iter()
            .map(|id| {
                vcf_samples
                    .iter()
                    .position(|sample| sample == id)
                    .map(|i| i + FIRST_SAMPLE_FIELD)
                    .ok_or_else(|| eyre!(SampleNotFoundError(id.clone())))
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn n_individuals(&self) -> usize {
        self.columns.len()
    }

    pub fn n_haplotypes(&self) -> usize {
        2 * self.columns.len()
    }
}
