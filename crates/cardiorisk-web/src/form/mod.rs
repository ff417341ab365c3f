//! Risk form submission: validation, request, and result display.
//!
//! A submission reads the age from the record table, checks it against the
//! range the equations support, checks every question is answered, and only
//! then sends one request to the [`RiskService`]. Every outcome, including
//! validation failures, ends up as text in the result container of the
//! [`FormView`].

pub mod age;
mod controller;

pub use controller::FormController;

use std::collections::HashSet;

use cardiorisk_calc::AGE_RANGE_MESSAGE;
use cardiorisk_common::{CardioRiskError, Question, RecordTable, RiskRequest, RiskResponse, Selections};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::risk::RiskService;

/// Why a submission did not produce a risk result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Could not find age element.")]
    MissingElement,

    #[error("Invalid age input. Please enter a valid number.")]
    InvalidInput,

    #[error("{}", AGE_RANGE_MESSAGE)]
    OutOfRange { age: i64 },

    #[error("There are unanswered questions.")]
    IncompleteForm { unanswered: Vec<Question> },

    #[error("An error occurred during the calculation. Please try again later.")]
    TransportFailure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Requesting,
    Displayed(String),
    Blocked(FormError),
}

/// Page state touched by a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormView {
    pub result_text: String,
    pub result_visible: bool,
    visible_markers: HashSet<Question>,
    pub state: SubmissionState,
}

impl FormView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_visible(&self, question: Question) -> bool {
        self.visible_markers.contains(&question)
    }

    /// Visible markers in form order.
    pub fn visible_markers(&self) -> Vec<Question> {
        Question::ALL
            .into_iter()
            .filter(|q| self.visible_markers.contains(q))
            .collect()
    }

    fn set_marker(&mut self, question: Question, visible: bool) {
        if visible {
            self.visible_markers.insert(question);
        } else {
            self.visible_markers.remove(&question);
        }
    }

    fn show_result(&mut self, text: impl Into<String>) {
        self.result_text = text.into();
        self.result_visible = true;
    }

    /// Write the error message into the result container and block.
    pub fn show_error(&mut self, err: FormError) {
        self.show_result(err.to_string());
        self.state = SubmissionState::Blocked(err);
    }
}

/// Run the synchronous checks of a submission.
///
/// On failure the error is already written to `view`; the caller only has
/// to stop.
pub fn validate(
    table: &RecordTable,
    selections: &Selections,
    view: &mut FormView,
) -> Result<RiskRequest, FormError> {
    view.state = SubmissionState::Validating;

    let checked = age::read_age(table).and_then(age::check_range);
    let age = match checked {
        Ok(age) => age,
        Err(err) => {
            debug!(error = %err, "age check failed");
            view.show_error(err.clone());
            return Err(err);
        }
    };

    for question in Question::ALL {
        view.set_marker(question, selections.get(question).is_none());
    }

    let answers = match selections.answers() {
        Some(answers) => answers,
        None => {
            let err = FormError::IncompleteForm { unanswered: selections.unanswered() };
            debug!(age, error = %err, "form incomplete");
            view.show_error(err.clone());
            return Err(err);
        }
    };

    view.state = SubmissionState::Requesting;
    Ok(RiskRequest::from(answers))
}

/// Record the outcome of the risk request in `view`.
pub fn apply_response(view: &mut FormView, outcome: Result<RiskResponse, CardioRiskError>) {
    match outcome {
        Ok(response) => {
            view.show_result(response.result.clone());
            view.state = SubmissionState::Displayed(response.result);
        }
        Err(e) => {
            error!(error = %e, "risk calculation request failed");
            view.show_error(FormError::TransportFailure);
        }
    }
}

/// One complete submission against `service`.
pub async fn submit(
    table: &RecordTable,
    selections: &Selections,
    view: &mut FormView,
    service: &dyn RiskService,
) {
    let request = match validate(table, selections, view) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "submission blocked");
            return;
        }
    };
    let outcome = service.calculate(request).await;
    apply_response(view, outcome);
}
