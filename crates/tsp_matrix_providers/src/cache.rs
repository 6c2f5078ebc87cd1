use std::{
    hash::{Hash, Hasher},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use fxhash::FxHasher64;

use crate::{travel_matrices::FetchedMatrices, travel_matrix_provider::TravelMatrixProvider};

pub const CACHE_FOLDER_ENV_VAR: &str = "TSP_CACHE_FOLDER";
pub const DEFAULT_CACHE_FOLDER: &str = "./.cache/matrices";

/// Stores fetched matrices along with the provider responses they came from.
pub trait MatricesCache {
    fn cache(
        &self,
        provider: &TravelMatrixProvider,
        points: &[geo_types::Point],
        fetched: &FetchedMatrices,
    ) -> Result<(), anyhow::Error>;

    fn get_cached(
        &self,
        provider: &TravelMatrixProvider,
        points: &[geo_types::Point],
    ) -> Result<Option<FetchedMatrices>, anyhow::Error>;
}

fn hash_points<H>(points: &[geo_types::Point], hasher: &mut H)
where
    H: Hasher,
{
    points.len().hash(hasher);
    for point in points {
        hasher.write_u64(point.x().to_bits());
        hasher.write_u64(point.y().to_bits());
    }
}

/// Fingerprint of an ordered point sequence and the provider used to fetch
/// its matrices. Reordering the points changes the fingerprint.
pub fn fingerprint(points: &[geo_types::Point], provider: &TravelMatrixProvider) -> String {
    let mut hasher = FxHasher64::default();

    hash_points(points, &mut hasher);
    provider.hash(&mut hasher);

    format!("{:016x}", hasher.finish())
}

/// One JSON file per fingerprint inside `folder`. Provider responses are
/// embedded in the entry exactly as they were received.
pub struct FileCache {
    folder: PathBuf,
}

impl FileCache {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// Uses `TSP_CACHE_FOLDER` when set, `./.cache/matrices` otherwise.
    pub fn from_env() -> Self {
        let folder =
            std::env::var(CACHE_FOLDER_ENV_VAR).unwrap_or_else(|_| DEFAULT_CACHE_FOLDER.to_string());
        Self::new(folder)
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn entry_path(
        &self,
        provider: &TravelMatrixProvider,
        points: &[geo_types::Point],
    ) -> PathBuf {
        self.folder
            .join(format!("{}.json", fingerprint(points, provider)))
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::from_env()
    }
}

impl MatricesCache for FileCache {
    fn cache(
        &self,
        provider: &TravelMatrixProvider,
        points: &[geo_types::Point],
        fetched: &FetchedMatrices,
    ) -> Result<(), anyhow::Error> {
        if self.folder.exists() && !self.folder.is_dir() {
            return Err(anyhow::anyhow!(format!(
                "Path {} is not a directory",
                self.folder.display()
            )));
        }

        std::fs::create_dir_all(&self.folder)?;

        let file = std::fs::File::create(self.entry_path(provider, points))?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        serde_json::to_writer(&mut writer, fetched)?;
        writer.flush()?;

        Ok(())
    }

    fn get_cached(
        &self,
        provider: &TravelMatrixProvider,
        points: &[geo_types::Point],
    ) -> Result<Option<FetchedMatrices>, anyhow::Error> {
        let file_path = self.entry_path(provider, points);

        if !file_path.is_file() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(file_path)?;
        let fetched: FetchedMatrices = serde_json::from_str(&contents)?;

        Ok(Some(fetched))
    }
}
