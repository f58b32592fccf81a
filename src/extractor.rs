use crate::client::{DiaryApi, EntriesQuery};
use crate::config::Config;
use crate::error::CaraError;
use crate::images::{ImageStore, ImageSummary};
use crate::models::group_by_date;
use crate::report::write_report;
use chrono::{Days, Local, NaiveDate};
use log::{info, warn};
use std::path::PathBuf;

/// Export window ending today: `(today - days, today)`.
pub fn date_window(today: NaiveDate, days: u64) -> Result<(NaiveDate, NaiveDate), CaraError> {
    let start = today
        .checked_sub_days(Days::new(days))
        .ok_or(CaraError::InvalidParameter(
            "lookback window reaches before the earliest supported date",
        ))?;
    Ok((start, today))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub entries: usize,
    pub days: usize,
    pub images: ImageSummary,
    /// The window held more entries than the single page returned.
    pub truncated: bool,
    pub output_path: PathBuf,
}

pub struct DataExtractor<A> {
    config: Config,
    api: A,
    images: ImageStore,
}

impl<A: DiaryApi> DataExtractor<A> {
    pub fn new(config: Config, api: A) -> Self {
        let images = ImageStore::new(config.image_folder.clone());
        Self {
            config,
            api,
            images,
        }
    }

    /// Export the window ending on the local calendar date.
    pub async fn run(&self) -> Result<RunReport, CaraError> {
        self.run_on(Local::now().date_naive()).await
    }

    pub async fn run_on(&self, today: NaiveDate) -> Result<RunReport, CaraError> {
        self.images.ensure_folder().await?;

        let (start, end) = date_window(today, self.config.lookback_days)?;
        let query = EntriesQuery {
            start,
            end,
            limit: self.config.page_size,
            offset: self.config.offset,
        };
        info!("Fetching diary entries from {} to {}", start, end);
        let page = self.api.fetch_entries(&query).await?;
        let truncated = page.is_truncated();
        if truncated {
            warn!(
                "Window {} to {} holds more than {} entries; only the first page is exported",
                start, end, self.config.page_size
            );
        }

        let mut images = ImageSummary::default();
        for entry in &page.results {
            for outcome in self.images.ensure_image(&self.api, entry).await? {
                images.record(&outcome);
            }
        }
        info!(
            "Images: {} downloaded, {} unavailable, {} already present",
            images.downloaded, images.unavailable, images.already_present
        );

        let entries = page.results.len();
        let grouped = group_by_date(page.results);
        write_report(&self.config.output_path, &grouped).await?;

        Ok(RunReport {
            start,
            end,
            entries,
            days: grouped.len(),
            images,
            truncated,
            output_path: self.config.output_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::tests::FakeApi;
    use serde_json::json;

    fn config(dir: &std::path::Path) -> Config {
        let mut config = Config::new(Some("token".into())).unwrap();
        config.image_folder = dir.join("images");
        config.output_path = dir.join("index.html");
        config
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_covers_lookback_days() {
        let (start, end) = date_window(day(2024, 7, 1), 180).unwrap();
        assert_eq!(start, day(2024, 1, 3));
        assert_eq!(end, day(2024, 7, 1));
    }

    #[test]
    fn window_before_earliest_date_is_rejected() {
        let err = date_window(NaiveDate::MIN, 1).unwrap_err();
        assert!(matches!(err, CaraError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn run_fetches_images_groups_and_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi {
            page: Some(json!({
                "count": 3,
                "results": [
                    {
                        "type": "food",
                        "userDateTracking": "2024-06-30",
                        "mealItems": [
                            { "hasImage": true, "realmIdString": "lunch" },
                            { "hasImage": true, "realmIdString": "missing" }
                        ]
                    },
                    { "type": "sleep", "userDateTracking": "2024-07-01" },
                    { "type": "food", "userDateTracking": "2024-06-30", "mealItems": [] }
                ]
            })),
            ..FakeApi::default()
        }
        .with_image("lunch", b"jpeg-bytes");
        let extractor = DataExtractor::new(config(dir.path()), api);

        let report = extractor.run_on(day(2024, 7, 1)).await.unwrap();

        let queries = extractor.api.entry_queries.lock().unwrap().clone();
        assert_eq!(
            queries,
            vec![EntriesQuery {
                start: day(2024, 1, 3),
                end: day(2024, 7, 1),
                limit: 500,
                offset: 0,
            }]
        );
        assert_eq!(report.entries, 3);
        assert_eq!(report.days, 2);
        assert!(!report.truncated);
        assert_eq!(report.images.downloaded, 1);
        assert_eq!(report.images.unavailable, 1);

        let images = dir.path().join("images");
        assert_eq!(std::fs::read(images.join("lunch.jpg")).unwrap(), b"jpeg-bytes");
        assert_eq!(
            std::fs::read_to_string(images.join("missing.txt")).unwrap(),
            "No image downloaded"
        );

        let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(html.find("2024-07-01").unwrap() < html.find("2024-06-30").unwrap());
    }

    #[tokio::test]
    async fn second_run_skips_downloaded_images() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi {
            page: Some(json!({
                "results": [{
                    "type": "food",
                    "userDateTracking": "2024-06-30",
                    "mealItems": [{ "hasImage": true, "realmIdString": "lunch" }]
                }]
            })),
            ..FakeApi::default()
        }
        .with_image("lunch", b"jpeg-bytes");
        let extractor = DataExtractor::new(config(dir.path()), api);

        extractor.run_on(day(2024, 7, 1)).await.unwrap();
        let report = extractor.run_on(day(2024, 7, 1)).await.unwrap();

        assert_eq!(extractor.api.image_requests(), vec!["lunch".to_string()]);
        assert_eq!(report.images.already_present, 1);
    }

    #[tokio::test]
    async fn reports_truncated_page() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi {
            page: Some(json!({ "count": 900, "results": [] })),
            ..FakeApi::default()
        };
        let extractor = DataExtractor::new(config(dir.path()), api);

        let report = extractor.run_on(day(2024, 7, 1)).await.unwrap();
        assert!(report.truncated);
        assert_eq!(report.days, 0);
    }

    #[tokio::test]
    async fn malformed_page_aborts_before_report() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = DataExtractor::new(config(dir.path()), FakeApi::default());

        let err = extractor.run_on(day(2024, 7, 1)).await.unwrap_err();
        assert!(matches!(err, CaraError::InvalidResponse));
        assert!(!dir.path().join("index.html").exists());
    }
}
