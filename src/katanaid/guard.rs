//! Duplicate-submission guard for sensitive forms.
//!
//! Flow Overview:
//! 1) Validate the values; failures are reported and nothing is dispatched.
//! 2) Change check: drop the attempt silently if a dispatch is in flight, the
//!    cooldown window is open, or the values equal the last dispatched ones.
//! 3) Record the values, open the cooldown window and mark the dispatch in
//!    flight, all under one lock with no await in between, so two rapid
//!    attempts can never both pass step 2.
//! 4) Run the dispatch. The in-flight flag is cleared on every exit path,
//!    including cancellation of the submitting future.
//!
//! The cooldown deadline is checked directly at attempt time; the timer task
//! only clears the expired window and is aborted on teardown.

use super::errors::{AppError, ValidationError};
use parking_lot::Mutex;
use std::{
    future::Future,
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::{task::JoinHandle, time::Instant};
use tracing::debug;

/// Values a guarded form submits.
pub trait Submission: Clone + PartialEq + Send + 'static {
    /// Local validation run before anything else.
    ///
    /// # Errors
    /// Returns the first problem the user has to fix.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Why an attempt was dropped without dispatching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Suppressed {
    Unchanged,
    CoolingDown,
    InFlight,
    Disposed,
}

#[derive(Debug)]
pub enum SubmitOutcome<T> {
    Invalid(ValidationError),
    Suppressed(Suppressed),
    Completed(T),
    Failed(AppError),
}

impl<T> SubmitOutcome<T> {
    #[must_use]
    pub const fn dispatched(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }
}

/// Values of the last dispatched attempt and the logical tick it was taken at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionRecord<F> {
    pub values: F,
    pub submitted_at: u64,
}

struct GuardState<F> {
    last: Option<SubmissionRecord<F>>,
    clock: u64,
    in_flight: bool,
    cooldown_until: Option<Instant>,
    cooldown_timer: Option<JoinHandle<()>>,
    disposed: bool,
}

impl<F> GuardState<F> {
    fn cooling_down(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.cooldown_timer.take() {
            timer.abort();
        }
    }
}

pub struct SubmissionGuard<F> {
    state: Arc<Mutex<GuardState<F>>>,
    cooldown: Duration,
}

impl<F: Submission> SubmissionGuard<F> {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(GuardState {
                last: None,
                clock: 0,
                in_flight: false,
                cooldown_until: None,
                cooldown_timer: None,
                disposed: false,
            })),
            cooldown,
        }
    }

    /// Whether the submit control should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        let state = self.state.lock();
        !state.disposed && !state.in_flight && !state.cooling_down(Instant::now())
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.state.lock().in_flight
    }

    #[must_use]
    pub fn is_cooling_down(&self) -> bool {
        self.state.lock().cooling_down(Instant::now())
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    #[must_use]
    pub fn last_record(&self) -> Option<SubmissionRecord<F>> {
        self.state.lock().last.clone()
    }

    /// Runs `dispatch` for `values` if validation and the change check pass.
    ///
    /// If the guard is disposed while `dispatch` is pending, its result is
    /// discarded and `Suppressed::Disposed` is returned.
    pub async fn submit<T, Fut>(
        &self,
        values: F,
        dispatch: impl FnOnce(F) -> Fut,
    ) -> SubmitOutcome<T>
    where
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Err(err) = values.validate() {
            debug!(error = %err, "submission rejected by validation");
            return SubmitOutcome::Invalid(err);
        }

        if let Err(reason) = self.begin(&values) {
            debug!(?reason, "submission suppressed");
            return SubmitOutcome::Suppressed(reason);
        }

        let in_flight = InFlight {
            state: Arc::clone(&self.state),
        };
        let result = dispatch(values).await;
        drop(in_flight);

        if self.is_disposed() {
            debug!("guard disposed during dispatch, ignoring result");
            return SubmitOutcome::Suppressed(Suppressed::Disposed);
        }

        match result {
            Ok(value) => SubmitOutcome::Completed(value),
            Err(err) => SubmitOutcome::Failed(err),
        }
    }

    /// Change check and dispatch bookkeeping in one critical section.
    fn begin(&self, values: &F) -> Result<(), Suppressed> {
        let mut state = self.state.lock();
        let now = Instant::now();

        if state.disposed {
            return Err(Suppressed::Disposed);
        }
        if state.in_flight {
            return Err(Suppressed::InFlight);
        }
        if state.cooling_down(now) {
            return Err(Suppressed::CoolingDown);
        }
        if state.last.as_ref().is_some_and(|last| last.values == *values) {
            return Err(Suppressed::Unchanged);
        }

        state.clock += 1;
        state.last = Some(SubmissionRecord {
            values: values.clone(),
            submitted_at: state.clock,
        });
        state.in_flight = true;

        let deadline = now + self.cooldown;
        state.cooldown_until = Some(deadline);
        state.cancel_timer();
        state.cooldown_timer = Some(spawn_cooldown_timer(
            Arc::downgrade(&self.state),
            deadline,
        ));
        Ok(())
    }
}

impl<F> SubmissionGuard<F> {
    /// Tears the guard down: cancels the cooldown timer and refuses further
    /// attempts. A dispatch still in flight settles but its result is ignored.
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        state.disposed = true;
        state.cooldown_until = None;
        state.cancel_timer();
    }
}

impl<F> Drop for SubmissionGuard<F> {
    fn drop(&mut self) {
        self.state.lock().cancel_timer();
    }
}

impl<F> std::fmt::Debug for SubmissionGuard<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SubmissionGuard")
            .field("cooldown", &self.cooldown)
            .field("in_flight", &state.in_flight)
            .field("cooldown_until", &state.cooldown_until)
            .field("clock", &state.clock)
            .field("disposed", &state.disposed)
            .finish()
    }
}

/// Clears `in_flight` when dropped, whether the dispatch finished or the
/// submitting future was cancelled.
struct InFlight<F> {
    state: Arc<Mutex<GuardState<F>>>,
}

impl<F> Drop for InFlight<F> {
    fn drop(&mut self) {
        self.state.lock().in_flight = false;
    }
}

fn spawn_cooldown_timer<F: Send + 'static>(
    state: Weak<Mutex<GuardState<F>>>,
    deadline: Instant,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;
        let Some(state) = state.upgrade() else {
            return;
        };
        let mut state = state.lock();
        if state
            .cooldown_until
            .is_some_and(|until| until <= Instant::now())
        {
            state.cooldown_until = None;
            state.cooldown_timer = None;
            debug!("cooldown window expired");
        }
    })
}
