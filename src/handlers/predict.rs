//! Prediction handlers.

use axum::extract::State;
use axum::{Form, Json};
use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::prediction::{Expenses, Profit};

use super::{AppError, AppState};

/// Lowest reference number handed out by `/result`.
pub const REFERENCE_MIN: u32 = 10_000;
/// Highest reference number handed out by `/result`.
pub const REFERENCE_MAX: u32 = 99_999;

#[derive(Debug, Deserialize)]
pub struct PredictForm {
    pub r_d_expenses: String,
    pub administration_expenses: String,
    pub marketing_expenses: String,
    pub state: String,
}

/// Prediction together with the inputs it was made from.
#[derive(Debug, Serialize)]
pub struct PredictionView {
    pub prediction: Profit,
    pub state_recognized: bool,
    #[serde(flatten)]
    pub expenses: Expenses,
    pub state: String,
}

/// `POST /predict`
pub async fn predict(
    State(state): State<AppState>,
    Form(form): Form<PredictForm>,
) -> Result<Json<PredictionView>, AppError> {
    let expenses = Expenses::parse(
        &form.r_d_expenses,
        &form.administration_expenses,
        &form.marketing_expenses,
    )?;
    let prediction = state.predictor.predict(&expenses, &form.state)?;

    Ok(Json(PredictionView {
        prediction: prediction.profit,
        state_recognized: prediction.state_recognized,
        expenses,
        state: form.state,
    }))
}

#[derive(Debug, Serialize)]
pub struct ResultView {
    /// Today's date, e.g. "March 05, 2025".
    pub current_date: String,
    pub reference_number: u32,
}

/// `GET /result`
pub async fn result() -> Json<ResultView> {
    Json(ResultView {
        current_date: Local::now().format("%B %d, %Y").to_string(),
        reference_number: rand::rng().random_range(REFERENCE_MIN..=REFERENCE_MAX),
    })
}
