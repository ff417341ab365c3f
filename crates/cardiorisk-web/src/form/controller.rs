use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cardiorisk_common::{CardioRiskError, RecordTable, Selections};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use super::{apply_response, validate, FormView};
use crate::risk::RiskService;

/// Owns a form's [`FormView`] and serialises its submissions.
///
/// At most one risk request per form is outstanding: a new submission
/// aborts the one in flight, and a response arriving for a superseded
/// submission is dropped instead of overwriting newer state.
pub struct FormController {
    view: Mutex<FormView>,
    service: Arc<dyn RiskService>,
    generation: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl FormController {
    pub fn new(service: Arc<dyn RiskService>) -> Self {
        Self {
            view: Mutex::new(FormView::new()),
            service,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    pub async fn view(&self) -> FormView {
        self.view.lock().await.clone()
    }

    /// Submit the form.
    ///
    /// Returns the resulting view, or `None` if a later submission took
    /// over before this one finished.
    pub async fn submit(&self, table: &RecordTable, selections: &Selections) -> Option<FormView> {
        // Generations only advance under the `in_flight` lock.
        let generation = {
            let mut in_flight = self.in_flight.lock().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(previous) = in_flight.take() {
                debug!(generation, "aborting superseded risk request");
                previous.abort();
            }
            generation
        };

        let request = {
            let mut view = self.view.lock().await;
            match validate(table, selections, &mut view) {
                Ok(request) => request,
                Err(_) => return Some(view.clone()),
            }
        };

        let service = Arc::clone(&self.service);
        let task = tokio::spawn(async move { service.calculate(request).await });
        {
            let mut in_flight = self.in_flight.lock().await;
            if self.generation.load(Ordering::SeqCst) == generation {
                *in_flight = Some(task.abort_handle());
            } else {
                task.abort();
            }
        }

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => return None,
            Err(e) => Err(CardioRiskError::Other(anyhow::anyhow!("risk request task failed: {e}"))),
        };

        let mut view = self.view.lock().await;
        let mut in_flight = self.in_flight.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            warn!(generation, "discarding stale risk response");
            return None;
        }
        in_flight.take();
        drop(in_flight);
        apply_response(&mut view, outcome);
        Some(view.clone())
    }
}
