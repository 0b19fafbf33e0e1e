//! Chart handlers.

use axum::extract::Query;
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::charts::{render_bar, render_pie, ExpenseMapping, Result as ChartResult};
use crate::prediction::encoder::parse_amount;

use super::AppError;

/// Query string shared by both chart endpoints. Absent amounts count as 0.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub r_d_expenses: Option<String>,
    pub administration_expenses: Option<String>,
    pub marketing_expenses: Option<String>,
}

impl ChartQuery {
    fn mapping(&self) -> Result<ExpenseMapping, AppError> {
        let amount = |field: &'static str, raw: &Option<String>| match raw.as_deref() {
            None | Some("") => Ok(0.0),
            Some(raw) => parse_amount(field, raw),
        };

        Ok(ExpenseMapping::new(
            amount("r_d_expenses", &self.r_d_expenses)?,
            amount("administration_expenses", &self.administration_expenses)?,
            amount("marketing_expenses", &self.marketing_expenses)?,
        ))
    }
}

/// Render off the async workers; plotting is CPU-bound.
async fn render_png(
    query: ChartQuery,
    render: fn(&ExpenseMapping) -> ChartResult<Vec<u8>>,
) -> Result<impl IntoResponse, AppError> {
    let mapping = query.mapping()?;
    let png = tokio::task::spawn_blocking(move || render(&mapping)).await??;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// `GET /bar_plot`
pub async fn bar_plot(Query(query): Query<ChartQuery>) -> Result<impl IntoResponse, AppError> {
    render_png(query, render_bar).await
}

/// `GET /pie_plot`
pub async fn pie_plot(Query(query): Query<ChartQuery>) -> Result<impl IntoResponse, AppError> {
    render_png(query, render_pie).await
}
