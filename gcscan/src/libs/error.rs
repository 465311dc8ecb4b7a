#[derive(Debug)]
pub enum GcscanError {
    MafRangeError(f64),
    NoSampleLineError,
    EmptyClusterFileError,
    SampleNotFoundError(String),
    PosParseError(String),
    PairParseError((u64, String)),
    MissingFieldError((u64, usize)),
    FileNotSupportedError(String),
}

impl std::fmt::Display for GcscanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MafRangeError(maf) => write!(
                f,
                "Minimum minor allele frequency {maf} is not within [0.0, 1.0]"
            ),
            Self::NoSampleLineError => write!(
                f,
                "The genotype stream ended before a sample header line was found"
            ),
            Self::EmptyClusterFileError => {
                write!(f, "The cluster assignment file contains no records")
            }
            Self::SampleNotFoundError(id) => write!(
                f,
                "Sample {id:?} from the cluster file is not in the genotype stream"
            ),
            Self::PosParseError(value) => {
                write!(f, "Position {value:?} is not an integer")
            }
            Self::PairParseError((pos, value)) => write!(
                f,
                "Failed to parse the phased pair {value:?} at position {pos}"
            ),
            Self::MissingFieldError((pos, field)) => write!(
                f,
                "The data line at position {pos} has no field at index {field}"
            ),
            Self::FileNotSupportedError(ext) => {
                write!(f, "File extension: {ext} is not supported")
            }
        }
    }
}
