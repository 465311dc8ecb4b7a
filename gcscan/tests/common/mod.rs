#![allow(dead_code)]
use std::path::PathBuf;

use gcscan::args::ScanArgs;
#[cfg(feature = "clap")]
use gcscan::clap::LogAndVerbosity;

pub const TEST_VCF: &str = "tests/data/test.vcf";
pub const TEST_CLUSTERS: &str = "tests/data/test.ibdclust.gz";
pub const OUTDIR: &str = "tests/results";
pub const MIN_MAF: f64 = 0.12;

pub fn scan_args(output: &str) -> ScanArgs {
    std::fs::create_dir_all(OUTDIR).unwrap();

    ScanArgs {
        clusters: PathBuf::from(TEST_CLUSTERS),
        min_maf: MIN_MAF,
        vcf: PathBuf::from(TEST_VCF),
        output: PathBuf::from(output),
        no_deletion: false,
    }
}

#[cfg(feature = "clap")]
pub fn silent_verbosity() -> LogAndVerbosity {
    LogAndVerbosity {
        verbosity: 1,
        log_file: None,
        silent: false,
    }
}
