use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};

use color_eyre::eyre::ensure;
use color_eyre::Result;
use itertools::Itertools;

use crate::args::ScanArgs;
use crate::error::GcscanError::MafRangeError;
use crate::io::{get_input, open_report_writer};
use crate::read_clusters::{ClusterReader, ClusterSync};
use crate::read_vcf::VcfReader;
use crate::structs::{ClusterRecord, ClusterTally, HapId, SampleMap, VariantRecord};

/// Clusters below this size cannot be called mixed.
pub const MIN_CLUSTER_SIZE: usize = 4;
/// Alleles below this in-cluster count do not form a subcluster.
pub const MIN_SUBCLUSTER_SIZE: usize = 2;
/// Upper minor allele frequency bound, not exposed on the command line.
pub const MAX_MAF: f64 = 1.0;

/// Site and cluster filtering knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanParams {
    pub min_maf: f64,
    pub max_maf: f64,
    /// Attribute fully homozygous mixtures to a structural deletion and
    /// suppress their reports.
    pub deletion: bool,
}

impl From<&ScanArgs> for ScanParams {
    fn from(args: &ScanArgs) -> Self {
        Self {
            min_maf: args.min_maf,
            max_maf: MAX_MAF,
            deletion: !args.no_deletion,
        }
    }
}

/// Counters that live for the whole scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanCounters {
    /// How many mixed clusters the deletion hypothesis explained away.
    pub deletions: u64,
    /// Reported events keyed by total subcluster size.
    pub event_sizes: BTreeMap<usize, u64>,
}

#[doc(hidden)]
pub fn run(args: ScanArgs) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&args.min_maf),
        MafRangeError(args.min_maf)
    );

    let clusters = ClusterReader::new(BufReader::new(get_input(Some(args.clusters.clone()))?))?;
    let mut vcf = VcfReader::new(BufReader::new(get_input(Some(args.vcf.clone()))?))?;
    let map = SampleMap::new(clusters.samples(), vcf.samples())?;

    tracing::info!("Input clusters: {:?}", args.clusters);
    tracing::info!(
        "Scanning {} individuals ({} haplotypes) with minimum MAF {}.",
        map.n_individuals(),
        map.n_haplotypes(),
        args.min_maf
    );

    let mut sync = ClusterSync::new(clusters)?;
    let mut writer = open_report_writer(args.output.clone())?;
    let params = ScanParams::from(&args);

    let mut counters = ScanCounters::default();
    scan(&mut vcf, &mut sync, &map, &params, &mut writer, &mut counters)?;

    tracing::info!("Deletion hypothesis invoked {} times.", counters.deletions);
    for (size, count) in &counters.event_sizes {
        tracing::debug!("Mixed clusters of total subcluster size {size}: {count}");
    }

    Ok(())
}

/// Drives the scan one variant at a time: synchronize, filter, tabulate,
/// partition. The cluster stream is only ever advanced by [`ClusterSync`].
pub fn scan<R1: BufRead, R2: BufRead, W: Write>(
    vcf: &mut VcfReader<R1>,
    sync: &mut ClusterSync<R2>,
    map: &SampleMap,
    params: &ScanParams,
    writer: &mut csv::Writer<W>,
    counters: &mut ScanCounters,
) -> Result<()> {
    while let Some(variant) = vcf.next_record(map)? {
        let clusters = sync.nearest(variant.pos)?;

        let distinct = variant.alleles.iter().unique().count();
        if distinct < 2 {
            continue;
        }

        let freqs = allele_frequencies(&variant.alleles);
        let maf = 1.0 - freqs.iter().fold(0.0_f64, |acc, freq| acc.max(*freq));
        if maf > params.max_maf || maf < params.min_maf {
            continue;
        }

        let mut tables = tabulate(&variant, clusters);
        let segregating = freqs.iter().filter(|freq| **freq > 0.0).count();
        if distinct > 2 && segregating > 2 {
            collapse_rare_alleles(&mut tables, &freqs, params.min_maf);
        }

        for (id, tally) in &tables {
            evaluate_cluster(*id, tally, &variant, clusters, params, writer, counters)?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Global per-allele frequencies indexed by allele code.
pub fn allele_frequencies(alleles: &[u8]) -> Vec<f64> {
    let max = alleles.iter().copied().max().unwrap_or(0);
    let mut freqs = vec![0.0; max as usize + 1];
    for allele in alleles {
        freqs[*allele as usize] += 1.0;
    }

    let n = alleles.len() as f64;
    freqs.iter_mut().for_each(|freq| *freq /= n);
    freqs
}

/// Per-cluster allele counts and sizes for one variant, keyed by cluster id.
///
/// A haplotype-count disagreement between the streams is reported and the
/// common prefix tabulated, which may misattribute identities.
pub fn tabulate(variant: &VariantRecord, clusters: &ClusterRecord) -> BTreeMap<usize, ClusterTally> {
    if variant.alleles.len() != clusters.assignments.len() {
        tracing::warn!(
            "Input streams disagree on haplotype count at position {}: {} vs {}",
            variant.pos,
            variant.alleles.len(),
            clusters.assignments.len()
        );
    }

    let n_codes = variant.alleles.iter().copied().max().unwrap_or(0) as usize + 1;
    let mut tables: BTreeMap<usize, ClusterTally> = BTreeMap::new();

    for (allele, cluster) in variant.alleles.iter().zip(&clusters.assignments) {
        let tally = tables.entry(*cluster).or_insert_with(|| ClusterTally {
            counts: vec![0; n_codes],
            size: 0,
        });
        tally.counts[*allele as usize] += 1;
        tally.size += 1;
    }

    tables
}

/// Zeroes the counts of every allele rarer than `min_maf` in all tallies so
/// only the two dominant alleles can drive a call at a multiallelic site.
pub fn collapse_rare_alleles(
    tables: &mut BTreeMap<usize, ClusterTally>,
    freqs: &[f64],
    min_maf: f64,
) {
    for (code, freq) in freqs.iter().enumerate() {
        if *freq < min_maf {
            for tally in tables.values_mut() {
                tally.counts[code] = 0;
            }
        }
    }
}

/// Decides not mixed / deletion / conversion for one cluster and reports the
/// subcluster partition in the latter case.
fn evaluate_cluster<W: Write>(
    id: usize,
    tally: &ClusterTally,
    variant: &VariantRecord,
    clusters: &ClusterRecord,
    params: &ScanParams,
    writer: &mut csv::Writer<W>,
    counters: &mut ScanCounters,
) -> Result<()> {
    if tally.size < MIN_CLUSTER_SIZE {
        return Ok(());
    }

    let candidates: Vec<u8> = tally
        .counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count >= MIN_SUBCLUSTER_SIZE)
        .map(|(code, _)| code as u8)
        .collect();

    match candidates.len() {
        0 | 1 => return Ok(()),
        2 => (),
        _ => tracing::warn!(
            "more than two alleles in cluster at {}, printing first two",
            variant.pos
        ),
    }

    let members: Vec<usize> = clusters
        .assignments
        .iter()
        .enumerate()
        .filter(|(index, cluster)| **cluster == id && *index < variant.alleles.len())
        .map(|(index, _)| index)
        .collect();

    let subcluster0: Vec<usize> = members
        .iter()
        .copied()
        .filter(|index| variant.alleles[*index] == candidates[0])
        .collect();
    let subcluster1: Vec<usize> = members
        .iter()
        .copied()
        .filter(|index| variant.alleles[*index] == candidates[1])
        .collect();

    let n_individuals = variant.alleles.len() / 2;
    if params.deletion
        && subcluster0
            .iter()
            .chain(&subcluster1)
            .all(|index| is_homozygous(&variant.alleles, *index, n_individuals))
    {
        counters.deletions += 1;
        return Ok(());
    }

    let mut record = vec![
        variant.pos.to_string(),
        subcluster0.len().to_string(),
        subcluster1.len().to_string(),
    ];
    record.extend(
        subcluster0
            .iter()
            .chain(&subcluster1)
            .map(|index| HapId::from_index(*index, n_individuals).to_string()),
    );
    writer.write_record(&record)?;

    *counters
        .event_sizes
        .entry(subcluster0.len() + subcluster1.len())
        .or_insert(0) += 1;

    Ok(())
}

/// Whether the individual owning haplotype `index` carries the same allele
/// on both sides at this site.
fn is_homozygous(alleles: &[u8], index: usize, n_individuals: usize) -> bool {
    let other = match index < n_individuals {
        true => index + n_individuals,
        false => index - n_individuals,
    };
    alleles[index] == alleles[other]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::get_report_writer;

    fn variant(pos: u64, alleles: &[u8]) -> VariantRecord {
        VariantRecord {
            pos,
            alleles: alleles.to_vec(),
        }
    }

    fn cluster_record(pos: u64, assignments: &[usize]) -> ClusterRecord {
        ClusterRecord {
            pos,
            assignments: assignments.to_vec(),
        }
    }

    fn evaluate_all(
        variant: &VariantRecord,
        clusters: &ClusterRecord,
        params: &ScanParams,
    ) -> (String, ScanCounters) {
        let mut writer = get_report_writer(vec![]);
        let mut counters = ScanCounters::default();
        let tables = tabulate(variant, clusters);
        for (id, tally) in &tables {
            evaluate_cluster(
                *id, tally, variant, clusters, params, &mut writer, &mut counters,
            )
            .unwrap();
        }
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        (out, counters)
    }

    fn params() -> ScanParams {
        ScanParams {
            min_maf: 0.1,
            max_maf: MAX_MAF,
            deletion: true,
        }
    }

    #[test]
    fn test_allele_frequencies() {
        let freqs = allele_frequencies(&[0, 0, 0, 1, 2, 0, 0, 0, 1, 0]);
        assert_eq!(freqs, vec![0.7, 0.2, 0.1]);
    }

    #[test]
    fn test_tabulate() {
        let variant = variant(100, &[0, 1, 1, 0, 0, 1, 1, 0]);
        let clusters = cluster_record(100, &[1, 1, 2, 2, 1, 1, 2, 2]);
        let tables = tabulate(&variant, &clusters);

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[&1].counts, vec![2, 2]);
        assert_eq!(tables[&1].size, 4);
        assert_eq!(tables[&2].counts, vec![2, 2]);
        assert_eq!(tables[&2].size, 4);
    }

    #[test]
    fn test_tabulate_over_the_common_prefix_on_mismatch() {
        let variant = variant(100, &[0, 1, 1, 0]);
        let clusters = cluster_record(100, &[1, 1, 1, 1, 1, 1]);
        let tables = tabulate(&variant, &clusters);

        assert_eq!(tables[&1].size, 4);
        assert_eq!(tables[&1].counts, vec![2, 2]);
    }

    #[test]
    fn test_collapse_rare_alleles() {
        let variant = variant(100, &[0, 1, 2, 1, 0, 1, 2, 1, 1, 1]);
        let clusters = cluster_record(100, &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1]);
        let mut tables = tabulate(&variant, &clusters);
        let freqs = allele_frequencies(&variant.alleles);

        collapse_rare_alleles(&mut tables, &freqs, 0.25);
        assert_eq!(tables[&1].counts, vec![0, 6, 0]);
    }

    // a 3/2 mixture with a heterozygous carrier is a conversion event
    #[test]
    fn test_mixed_cluster_is_reported() {
        // individuals 0..4, side-0 block first; individual 0 is heterozygous
        let variant = variant(200, &[1, 1, 1, 0, 0, 0, 1, 1, 0, 0]);
        let clusters = cluster_record(200, &[1, 1, 1, 1, 1, 2, 3, 4, 5, 6]);

        let (out, counters) = evaluate_all(&variant, &clusters, &params());
        assert_eq!(out, "200 2 3 3:0 4:0 0:0 1:0 2:0\n");
        assert_eq!(counters.deletions, 0);
        assert_eq!(counters.event_sizes[&5], 1);
    }

    // the same mixture with every carrier homozygous is a deletion
    #[test]
    fn test_homozygous_mixture_is_a_deletion() {
        let variant = variant(300, &[1, 1, 1, 0, 0, 1, 1, 1, 0, 0]);
        let clusters = cluster_record(300, &[1, 1, 1, 1, 1, 2, 3, 4, 5, 6]);

        let (out, counters) = evaluate_all(&variant, &clusters, &params());
        assert_eq!(out, "");
        assert_eq!(counters.deletions, 1);
        assert!(counters.event_sizes.is_empty());
    }

    #[test]
    fn test_deletion_check_can_be_disabled() {
        let variant = variant(300, &[1, 1, 1, 0, 0, 1, 1, 1, 0, 0]);
        let clusters = cluster_record(300, &[1, 1, 1, 1, 1, 2, 3, 4, 5, 6]);
        let params = ScanParams {
            deletion: false,
            ..params()
        };

        let (out, counters) = evaluate_all(&variant, &clusters, &params);
        assert_eq!(out, "300 2 3 3:0 4:0 0:0 1:0 2:0\n");
        assert_eq!(counters.deletions, 0);
    }

    #[test]
    fn test_small_clusters_are_skipped() {
        // a mixed cluster of size 3 stays below the size floor
        let variant = variant(400, &[1, 1, 0, 0, 1, 1, 0, 0]);
        let clusters = cluster_record(400, &[1, 1, 1, 2, 3, 4, 5, 6]);

        let (out, counters) = evaluate_all(&variant, &clusters, &params());
        assert_eq!(out, "");
        assert_eq!(counters.deletions, 0);
    }

    #[test]
    fn test_unmixed_cluster_is_skipped() {
        let variant = variant(500, &[1, 1, 1, 1, 0, 1, 1, 1, 1, 0]);
        let clusters = cluster_record(500, &[1, 1, 1, 1, 2, 1, 1, 1, 1, 2]);

        let (out, counters) = evaluate_all(&variant, &clusters, &params());
        assert_eq!(out, "");
        assert_eq!(counters.deletions, 0);
    }

    // more than two candidate alleles: the first two by allele code win
    #[test]
    fn test_three_candidate_alleles_use_the_two_lowest_codes() {
        let variant = variant(600, &[0, 0, 1, 1, 2, 2, 0, 1, 1, 2, 2, 0]);
        let clusters = cluster_record(600, &[1, 1, 1, 1, 1, 1, 2, 3, 4, 5, 6, 7]);

        let (out, _) = evaluate_all(&variant, &clusters, &params());
        assert_eq!(out, "600 2 2 0:0 1:0 2:0 3:0\n");
    }

    #[test]
    fn test_scan_end_to_end() {
        let vcf_text = "\
##fileformat=VCFv4.2
#CHROM POS ID REF ALT QUAL FILTER INFO FORMAT S1 S2 S3 S4 S5
chr1 100 . A G . PASS . GT 0|0 0|0 0|0 0|0 0|0
chr1 200 . A G . PASS . GT 1|0 1|1 1|1 0|0 0|0
chr1 300 . A G . PASS . GT 1|1 1|1 1|1 0|0 0|0
";
        let cluster_text = "\
CHROM POS CM S1 S2 S3 S4 S5
chr1 190 0.1 1|2 1|3 1|4 1|5 1|6
chr1 310 0.2 1|2 1|3 1|4 1|5 1|6
";

        let mut vcf = VcfReader::new(std::io::Cursor::new(vcf_text)).unwrap();
        let clusters = ClusterReader::new(std::io::Cursor::new(cluster_text)).unwrap();
        let map = SampleMap::new(clusters.samples(), vcf.samples()).unwrap();
        let mut sync = ClusterSync::new(clusters).unwrap();
        let mut writer = get_report_writer(vec![]);
        let mut counters = ScanCounters::default();

        scan(
            &mut vcf,
            &mut sync,
            &map,
            &params(),
            &mut writer,
            &mut counters,
        )
        .unwrap();

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(out, "200 2 3 3:0 4:0 0:0 1:0 2:0\n");
        assert_eq!(counters.deletions, 1);
        assert_eq!(counters.event_sizes[&5], 1);
    }

    // the lower MAF bound is inclusive: a site at exactly min_maf is kept
    #[test]
    fn test_maf_boundary_is_inclusive() {
        let vcf_text = "\
#CHROM POS ID REF ALT QUAL FILTER INFO FORMAT S1 S2 S3 S4
chr1 100 . A G . PASS . GT 1|0 1|0 0|0 0|0
chr1 200 . A G . PASS . GT 1|0 0|0 0|0 0|0
";
        let cluster_text = "\
CHROM POS CM S1 S2 S3 S4
chr1 100 0.1 1|1 1|1 2|2 2|2
";
        // pos 100: maf 0.25 == min_maf, kept; pos 200: maf 0.125, filtered
        let run = |min_maf: f64| -> String {
            let mut vcf = VcfReader::new(std::io::Cursor::new(vcf_text)).unwrap();
            let clusters = ClusterReader::new(std::io::Cursor::new(cluster_text)).unwrap();
            let map = SampleMap::new(clusters.samples(), vcf.samples()).unwrap();
            let mut sync = ClusterSync::new(clusters).unwrap();
            let mut writer = get_report_writer(vec![]);
            let mut counters = ScanCounters::default();
            let params = ScanParams {
                min_maf,
                max_maf: MAX_MAF,
                deletion: true,
            };
            scan(
                &mut vcf,
                &mut sync,
                &map,
                &params,
                &mut writer,
                &mut counters,
            )
            .unwrap();
            String::from_utf8(writer.into_inner().unwrap()).unwrap()
        };

        assert_eq!(run(0.25), "100 2 2 0:1 1:1 0:0 1:0\n");
        assert_eq!(run(0.26), "");
    }

    // at a true multiallelic site, collapsing a rare allele changes which
    // two alleles partition the cluster
    #[test]
    fn test_rare_allele_collapse_before_partitioning() {
        let vcf_text = "\
#CHROM POS ID REF ALT QUAL FILTER INFO FORMAT S1 S2 S3 S4 S5 S6 S7 S8 S9 S10
chr1 100 . A G,T . PASS . GT 0|1 0|1 1|1 1|2 2|1 2|2 1|1 1|2 2|1 1|2
";
        let cluster_text = "\
CHROM POS CM S1 S2 S3 S4 S5 S6 S7 S8 S9 S10
chr1 100 0.1 1|2 1|3 1|4 1|5 1|6 1|7 8|9 10|11 12|13 14|15
";
        let mut vcf = VcfReader::new(std::io::Cursor::new(vcf_text)).unwrap();
        let clusters = ClusterReader::new(std::io::Cursor::new(cluster_text)).unwrap();
        let map = SampleMap::new(clusters.samples(), vcf.samples()).unwrap();
        let mut sync = ClusterSync::new(clusters).unwrap();
        let mut writer = get_report_writer(vec![]);
        let mut counters = ScanCounters::default();
        let params = ScanParams {
            min_maf: 0.12,
            max_maf: MAX_MAF,
            deletion: true,
        };

        scan(
            &mut vcf,
            &mut sync,
            &map,
            &params,
            &mut writer,
            &mut counters,
        )
        .unwrap();

        // allele 0 sits at 2/20 < 0.12 and is collapsed away, so the cluster
        // of S1..S6 side-0 haplotypes partitions by alleles 1 and 2 instead
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(out, "100 2 2 2:0 3:0 4:0 5:0\n");
    }
}
