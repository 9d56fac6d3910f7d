//! Quiet-period debouncing for realtime validation.

use crate::domain::profile::ProfileForm;
use crate::form::validation::{validate_realtime, ErrorMap};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Holds the latest value until `delay` passes without a newer one.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(due) if now >= due => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Re-validates form snapshots once edits pause for `delay` and publishes the
/// resulting error maps. Ends when either side of the channels is dropped.
pub fn spawn_debounced_validator(
    mut forms: watch::Receiver<ProfileForm>,
    delay: Duration,
) -> (watch::Receiver<ErrorMap>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(ErrorMap::new());

    let handle = tokio::spawn(async move {
        while forms.changed().await.is_ok() {
            let mut debouncer = Debouncer::new(delay);
            debouncer.push((), Instant::now());

            while let Some(due) = debouncer.deadline() {
                tokio::select! {
                    changed = forms.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        debouncer.push((), Instant::now());
                    }
                    _ = tokio::time::sleep_until(due) => {
                        debouncer.poll(Instant::now());
                    }
                }
            }

            let errors = validate_realtime(&forms.borrow_and_update());
            tracing::debug!("🔍 realtime validation: {}", errors.summary());
            if tx.send(errors).is_err() {
                return;
            }
        }
    });

    (rx, handle)
}
