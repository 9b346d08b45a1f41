use anyhow::{Context, Result};
use image::GrayImage;
use itertools::Itertools;
use std::path::{Path, PathBuf};
use tracing::info;
use yarntrack_rs::{FrameReport, FrameSink, FrameSource};

/// Returns the files matching `pattern`, sorted by file name.
pub fn sorted_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .with_context(|| format!("invalid glob pattern {pattern}"))?
        .filter_map(|path| path.ok())
        .sorted_by(|a, b| a.file_name().cmp(&b.file_name()))
        .collect::<Vec<_>>();
    Ok(paths)
}

/// Decode an image file as 8-bit grayscale.
pub fn read_gray(path: &Path) -> Result<GrayImage> {
    Ok(image::io::Reader::open(path)
        .with_context(|| format!("cannot open {}", path.display()))?
        .decode()
        .with_context(|| format!("cannot decode {}", path.display()))?
        .to_luma8())
}

/// Mask images on disk, in temporal (file name) order.
#[derive(Debug)]
pub struct FrameFiles {
    paths: Vec<PathBuf>,
}

impl FrameFiles {
    pub fn from_glob(pattern: &str) -> Result<FrameFiles> {
        let paths = sorted_glob(pattern)?;
        info!("found {} frames matching {pattern}", paths.len());
        Ok(FrameFiles { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FrameSource for FrameFiles {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn load(&self, index: usize) -> Result<GrayImage> {
        let path = self
            .paths
            .get(index)
            .with_context(|| format!("no frame at index {index}"))?;
        read_gray(path)
    }
}

/// Writes each tracked canvas under the input's file name and logs the frame status.
#[derive(Debug)]
pub struct FrameWriter<'a> {
    directory: PathBuf,
    inputs: &'a [PathBuf],
}

impl<'a> FrameWriter<'a> {
    pub fn new(directory: &Path, inputs: &'a [PathBuf]) -> Result<FrameWriter<'a>> {
        std::fs::create_dir_all(directory)
            .with_context(|| format!("cannot create {}", directory.display()))?;
        Ok(FrameWriter {
            directory: directory.to_path_buf(),
            inputs,
        })
    }
}

impl FrameSink for FrameWriter<'_> {
    fn emit(&mut self, index: usize, canvas: &GrayImage, report: &FrameReport) -> Result<()> {
        let file_name = self
            .inputs
            .get(index)
            .and_then(|path| path.file_name())
            .with_context(|| format!("no file name for frame {index}"))?;
        let output = self.directory.join(file_name);
        canvas
            .save(&output)
            .with_context(|| format!("cannot write {}", output.display()))?;

        let [tier1, tier2, tier3] = &report.escalated;
        info!(
            "{} tier1=[{}] tier2=[{}] tier3=[{}]",
            output.display(),
            tier1.iter().join(", "),
            tier2.iter().join(", "),
            tier3.iter().join(", "),
        );
        Ok(())
    }
}
