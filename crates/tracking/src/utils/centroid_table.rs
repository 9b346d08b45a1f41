use crate::utils::frame_files::{read_gray, sorted_glob};
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::path::Path;
use tracing::{error, info};
use yarntrack_rs::measurement;

/// Write the mean row of every target intensity in each tracked image as a CSV table.
///
/// The intensities are taken from the middle image of the sequence: every distinct value of at
/// least `min_gray` becomes one `Yarn n` column. Images that cannot be read are logged and left out.
pub fn write(pattern: &str, output: &Path, min_gray: u8) -> Result<()> {
    let files = sorted_glob(pattern)?;
    if files.is_empty() {
        bail!("no images match {pattern}");
    }

    let reference = &files[files.len() / 2];
    let levels = measurement::gray_levels(&read_gray(reference)?, min_gray);
    info!(
        "{} target intensities in {}",
        levels.len(),
        reference.display()
    );

    let rows = files
        .par_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            read_gray(path)
                .map(|image| (name, measurement::row_centroids(&image, &levels)))
                .map_err(|e| error!("skipping {}: {e:#}", path.display()))
                .ok()
        })
        .collect::<Vec<_>>();

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("cannot create {}", output.display()))?;
    let header = std::iter::once("Image Name".to_string())
        .chain((1..=levels.len()).map(|i| format!("Yarn {i}")));
    writer.write_record(header)?;
    for (name, centroids) in rows.into_iter().flatten() {
        writer.write_record(
            std::iter::once(name).chain(centroids.iter().map(|row| row.to_string())),
        )?;
    }
    writer.flush()?;

    info!("wrote {}", output.display());
    Ok(())
}
