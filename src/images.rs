use crate::client::{DiaryApi, ImageResponse};
use crate::error::CaraError;
use crate::models::DiaryEntry;
use log::{debug, info, warn};
use reqwest::StatusCode;
use std::path::{Path, PathBuf};

pub const SENTINEL_TEXT: &str = "No image downloaded";

/// What happened to one meal photo during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// `{id}.jpg` was already on disk; nothing was requested.
    AlreadyPresent(PathBuf),
    Downloaded { path: PathBuf, bytes: usize },
    /// Non-200 answer; the `{id}.txt` marker was written instead.
    Unavailable { path: PathBuf, status: StatusCode },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageSummary {
    pub already_present: usize,
    pub downloaded: usize,
    pub unavailable: usize,
}

impl ImageSummary {
    pub fn record(&mut self, outcome: &ImageOutcome) {
        match outcome {
            ImageOutcome::AlreadyPresent(_) => self.already_present += 1,
            ImageOutcome::Downloaded { .. } => self.downloaded += 1,
            ImageOutcome::Unavailable { .. } => self.unavailable += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.already_present + self.downloaded + self.unavailable
    }
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    folder: PathBuf,
}

impl ImageStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn image_path(&self, image_id: &str) -> PathBuf {
        self.folder.join(format!("{image_id}.jpg"))
    }

    pub fn sentinel_path(&self, image_id: &str) -> PathBuf {
        self.folder.join(format!("{image_id}.txt"))
    }

    /// Create the image folder if needed. Returns `true` when it was created.
    pub async fn ensure_folder(&self) -> Result<bool, CaraError> {
        if tokio::fs::try_exists(&self.folder)
            .await
            .map_err(|e| CaraError::io(&self.folder, e))?
        {
            info!("Folder '{}' already exists", self.folder.display());
            return Ok(false);
        }
        tokio::fs::create_dir_all(&self.folder)
            .await
            .map_err(|e| CaraError::io(&self.folder, e))?;
        info!("Folder '{}' created", self.folder.display());
        Ok(true)
    }

    /// Make sure every photo of a food entry is on disk, downloading the
    /// missing ones one after another. Non-food entries are ignored.
    ///
    /// Only `{id}.jpg` counts as present, so ids that previously failed are
    /// requested again.
    pub async fn ensure_image<A: DiaryApi>(
        &self,
        api: &A,
        entry: &DiaryEntry,
    ) -> Result<Vec<ImageOutcome>, CaraError> {
        let mut outcomes = Vec::new();
        if !entry.is_food() {
            return Ok(outcomes);
        }
        for item in entry.meal_items.iter().filter(|item| item.has_image) {
            let Some(image_id) = item.realm_id_string.as_deref() else {
                warn!(
                    "Meal item on {} has an image but no realmIdString, skipping",
                    entry.user_date_tracking
                );
                continue;
            };
            let path = self.image_path(image_id);
            if self.file_exists(&path).await? {
                outcomes.push(ImageOutcome::AlreadyPresent(path));
                continue;
            }
            outcomes.push(self.download_image(api, image_id).await?);
        }
        Ok(outcomes)
    }

    /// Request one photo and store it, or the failure marker when the
    /// dashboard does not answer 200.
    pub async fn download_image<A: DiaryApi>(
        &self,
        api: &A,
        image_id: &str,
    ) -> Result<ImageOutcome, CaraError> {
        info!("Attempting image download: {}", image_id);
        match api.fetch_image(image_id).await? {
            ImageResponse::Found(bytes) => {
                let path = self.image_path(image_id);
                tokio::fs::write(&path, &bytes)
                    .await
                    .map_err(|e| CaraError::io(&path, e))?;
                debug!("Wrote {} bytes to {}", bytes.len(), path.display());
                Ok(ImageOutcome::Downloaded {
                    path,
                    bytes: bytes.len(),
                })
            }
            ImageResponse::Unavailable(status) => {
                let path = self.sentinel_path(image_id);
                tokio::fs::write(&path, SENTINEL_TEXT)
                    .await
                    .map_err(|e| CaraError::io(&path, e))?;
                warn!("No image for {} (status {})", image_id, status);
                Ok(ImageOutcome::Unavailable { path, status })
            }
        }
    }

    async fn file_exists(&self, path: &Path) -> Result<bool, CaraError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| CaraError::io(path, e))?;
        if exists {
            debug!("The file '{}' exists", path.display());
        } else {
            debug!("The file '{}' does not exist", path.display());
        }
        Ok(exists)
    }
}
