use crate::error::CaraError;
use crate::models::DayGroup;
use askama::Template;
use log::info;
use std::path::Path;

/// `templates/food-diary.html`, bound to the grouped entries only.
#[derive(Template)]
#[template(path = "food-diary.html")]
pub struct FoodDiaryTemplate<'a> {
    pub grouped_data: &'a [DayGroup],
}

pub fn render_report(grouped_data: &[DayGroup]) -> Result<String, CaraError> {
    let html = FoodDiaryTemplate { grouped_data }.render()?;
    Ok(html)
}

/// Render the report and replace whatever is at `path`.
pub async fn write_report(path: &Path, grouped_data: &[DayGroup]) -> Result<(), CaraError> {
    let html = render_report(grouped_data)?;
    tokio::fs::write(path, &html)
        .await
        .map_err(|e| CaraError::io(path, e))?;
    info!(
        "Wrote report with {} days to {}",
        grouped_data.len(),
        path.display()
    );
    Ok(())
}
