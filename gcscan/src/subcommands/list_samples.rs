use std::io::BufReader;
use std::path::PathBuf;

use color_eyre::Result;

use crate::io::{get_input, FileType};
use crate::read_clusters::ClusterReader;
use crate::read_vcf::VcfReader;

pub fn get_sample_names(path: PathBuf) -> Result<Vec<String>> {
    let file_type = FileType::from_path(&path)?;
    let input = BufReader::new(get_input(Some(path))?);

    let ids = match file_type {
        FileType::Vcf => VcfReader::new(input)?.samples().to_vec(),
        FileType::IbdClust => ClusterReader::new(input)?.samples().to_vec(),
    };

    Ok(ids)
}

#[doc(hidden)]
pub fn run(path: PathBuf) -> Result<()> {
    let ids = get_sample_names(path)?;
    for id in ids {
        println!("{id}");
    }
    Ok(())
}
