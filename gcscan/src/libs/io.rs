use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use csv::{QuoteStyle, Writer, WriterBuilder};

use crate::error::GcscanError::FileNotSupportedError;

pub enum FileType {
    Vcf,
    IbdClust,
}

impl FileType {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = get_extension(path)?;

        Ok(match extension.as_str() {
            "vcf.gz" | "vcf" => Self::Vcf,
            "ibdclust.gz" | "ibdclust" => Self::IbdClust,
            _ => return Err(eyre!(FileNotSupportedError(extension))),
        })
    }
}

pub fn get_extension(path: &Path) -> Result<String> {
    fn double_extension(path: &Path, e1: &str) -> Result<String> {
        let stem = path
            .file_stem()
            .and_then(OsStr::to_str)
            .ok_or_else(|| eyre!("file has no stem"))?;
        let e2 = Path::new(&stem)
            .extension()
            .and_then(OsStr::to_str)
            .ok_or_else(|| eyre!("file has no other filetype"))?;
        Ok(format!("{e2}.{e1}"))
    }

    let extension: &str = Path::new(&path)
        .extension()
        .and_then(OsStr::to_str)
        .ok_or_else(|| eyre!("No filetype in path"))?;

    match extension {
        "gz" | "bgz" => double_extension(path, extension),
        _ => Ok(extension.to_string()),
    }
}

pub fn get_input(filename: Option<PathBuf>) -> Result<Box<dyn io::Read>> {
    let input: Box<dyn io::Read> = match filename {
        Some(name) => match name.to_str() {
            Some("-") => Box::new(io::stdin()),
            Some(name) => {
                let r = match niffler::from_path(name) {
                    Ok(x) => x.0,
                    Err(err) => {
                        let msg = format!("failed to open \"{name}\": {err}");
                        return Err(eyre!(msg))?;
                    }
                };
                Box::new(r)
            }
            None => return Err(eyre!("Unknown I/O error")),
        },
        None => Box::new(io::stdin()),
    };
    Ok(input)
}

pub fn get_output(filename: Option<PathBuf>) -> Result<Box<dyn io::Write>> {
    let output: Box<dyn io::Write> = match filename {
        Some(name) => match name.to_str() {
            Some("-") => Box::new(io::stdout()),
            Some(name) => Box::new(
                match std::fs::File::options()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(name)
                {
                    Ok(x) => x,
                    Err(err) => return Err(eyre!("failed to open \"{name}\": {err}"))?,
                },
            ),
            None => return Err(eyre!("Unknown I/O error")),
        },
        None => Box::new(io::stdout()),
    };
    Ok(output)
}

/// Report lines are space delimited and never quoted.
pub fn get_report_writer<W: io::Write>(output: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .double_quote(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(output)
}

pub fn open_report_writer(name: PathBuf) -> Result<Writer<Box<dyn io::Write>>> {
    Ok(get_report_writer(get_output(Some(name))?))
}
