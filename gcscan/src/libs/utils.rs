use std::str::FromStr;

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::error::GcscanError::PairParseError;

// Phased pairs are in the format [a]|[b]; trailing :-delimited annotations
// such as VCF per-sample fields beyond GT are ignored
pub fn parse_phased_pair<T: FromStr>(token: &str, pos: u64) -> Result<(T, T)> {
    let pair = token.split(':').next().unwrap_or(token);
    let mut sides = pair.split('|');

    match (sides.next(), sides.next()) {
        (Some(a), Some(b)) => {
            let a = a
                .parse::<T>()
                .map_err(|_| eyre!(PairParseError((pos, token.into()))))?;
            let b = b
                .parse::<T>()
                .map_err(|_| eyre!(PairParseError((pos, token.into()))))?;
            Ok((a, b))
        }
        _ => Err(eyre!(PairParseError((pos, token.into())))),
    }
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;

    #[test]
    fn test_parse_phased_pair() {
        let (a, b) = parse_phased_pair::<u8>("0|1", 100).unwrap();
        assert_eq!((a, b), (0, 1));

        let (a, b) = parse_phased_pair::<usize>("12|7", 100).unwrap();
        assert_eq!((a, b), (12, 7));
    }

    #[test]
    fn test_annotations_are_ignored() {
        let (a, b) = parse_phased_pair::<u8>("1|0:35:0.99", 100).unwrap();
        assert_eq!((a, b), (1, 0));
    }

    #[test]
    fn test_unphased_pair_is_an_error() {
        assert!(parse_phased_pair::<u8>("0/1", 100).is_err());
        assert!(parse_phased_pair::<u8>(".", 100).is_err());
        assert!(parse_phased_pair::<u8>("a|b", 100).is_err());
    }
}
