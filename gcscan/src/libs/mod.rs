// GCSCAN - Gene conversion scanner
// Copyright (C) 2025
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! GCSCAN - Gene conversion scanner
//!
//! Scans a phased genotype stream together with identity-by-descent cluster
//! assignments for the same cohort and reports positions where a cluster
//! splits into two internally consistent but disagreeing allele groups, the
//! signature of a localized allele transfer. Clusters where every carrier is
//! homozygous are attributed to a structural deletion instead and suppressed.
//!
//! ## Running GCSCAN
//!
//! To print the available commands use:
//! ```bash
//! gcscan --help
//! ```
//! The cluster file is the output of running `ibdcluster` on the same VCF.
//! Use the same minimum minor allele frequency for both programs:
//! ```bash
//! zcat genotypes.vcf.gz | gcscan scan myibd.ibdclust.gz 0.1 > conversions.txt
//! ```
//!

#[doc(hidden)]
pub mod args;

#[doc(hidden)]
pub mod io;

/// Streaming reader for the phased genotype stream
pub mod read_vcf;

/// Streaming reader and position synchronizer for cluster assignments
pub mod read_clusters;

/// GCSCAN structs
pub mod structs;

#[doc(hidden)]
pub mod utils;

#[doc(hidden)]
pub mod error;

#[cfg(feature = "clap")]
pub mod clap;
