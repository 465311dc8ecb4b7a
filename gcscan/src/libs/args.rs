use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ScanArgs {
    /// Cluster assignment file from running ibdcluster on the same VCF
    pub clusters: PathBuf,

    /// Minimum minor allele frequency, use the value the clustering ran with
    pub min_maf: f64,

    /// Phased genotype VCF, "-" reads from stdin
    #[cfg_attr(feature = "clap", arg(long, default_value_os_t = PathBuf::from("-")))]
    pub vcf: PathBuf,

    /// Report file, "-" writes to stdout
    #[cfg_attr(feature = "clap", arg(short = 'o', long, default_value_os_t = PathBuf::from("-")))]
    pub output: PathBuf,

    /// Do not attribute fully homozygous mixed clusters to a deletion
    #[cfg_attr(feature = "clap", arg(long))]
    pub no_deletion: bool,
}

impl Default for ScanArgs {
    fn default() -> Self {
        Self {
            clusters: PathBuf::new(),
            min_maf: 0.0,
            vcf: PathBuf::from("-"),
            output: PathBuf::from("-"),
            no_deletion: false,
        }
    }
}
