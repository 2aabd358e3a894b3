//! Fire-and-forget external calls.
//!
//! `spawn_*` returns a [`CallSlot`] immediately and runs the call on the
//! tokio runtime. When the call finishes its outcome is written into the
//! slot, whether or not anyone is still looking. There is no cancellation.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::Notify;

use crate::dashboard::FarmMetrics;
use crate::email::{EmailMessage, EmailRecord, EmailSink};
use crate::error::{CallFailure, ServiceError};
use crate::intelligence::{self, Alert, TextService};
use crate::state::SharedState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum CallState<T> {
    Pending,
    Resolved(T),
    Failed(CallFailure),
}

impl<T> CallState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, CallState::Pending)
    }
}

/// Shared handle to the outcome of one call.
pub struct CallSlot<T> {
    state: Arc<Mutex<CallState<T>>>,
    notify: Arc<Notify>,
}

impl<T> Clone for CallSlot<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl<T> Default for CallSlot<T> {
    fn default() -> Self {
        Self::pending()
    }
}

impl<T> CallSlot<T> {
    pub fn pending() -> Self {
        Self {
            state: Arc::new(Mutex::new(CallState::Pending)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().is_pending()
    }

    fn set(&self, state: CallState<T>) {
        *self.state.lock() = state;
        self.notify.notify_waiters();
    }
}

impl<T: Clone> CallSlot<T> {
    pub fn get(&self) -> CallState<T> {
        self.state.lock().clone()
    }

    /// Wait until the call has resolved or failed.
    pub async fn settled(&self) -> CallState<T> {
        loop {
            let notified = self.notify.notified();
            {
                let state = self.state.lock();
                if !state.is_pending() {
                    return state.clone();
                }
            }
            notified.await;
        }
    }
}

/// Run `future` in the background and record its outcome in the returned slot.
///
/// Outside a tokio runtime the slot fails immediately instead of panicking.
pub fn spawn_call<T, F>(label: &'static str, future: F) -> CallSlot<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, ServiceError>> + Send + 'static,
{
    let slot = CallSlot::pending();
    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            log::error!("{} call started outside an async runtime", label);
            slot.set(CallState::Failed(CallFailure {
                message: "no async runtime".to_string(),
                transient: false,
            }));
            return slot;
        }
    };

    let writer = slot.clone();
    handle.spawn(async move {
        let state = match future.await {
            Ok(value) => CallState::Resolved(value),
            Err(e) => {
                log::warn!("{} call failed: {}", label, e);
                CallState::Failed(CallFailure::from(&e))
            }
        };
        writer.set(state);
    });
    slot
}

pub fn spawn_image_analysis(
    service: Arc<dyn TextService>,
    bytes: Vec<u8>,
    mime_type: String,
) -> CallSlot<String> {
    spawn_call("image analysis", async move {
        intelligence::try_analyze_image(service.as_ref(), bytes, &mime_type).await
    })
}

/// Context is read from `state` before the call starts; the lock is not held
/// across the request.
pub fn spawn_advisor(
    service: Arc<dyn TextService>,
    state: SharedState,
    query: String,
    today: NaiveDate,
) -> CallSlot<String> {
    let context = intelligence::advisor_context(&state.lock(), today);
    spawn_call("advisor", async move {
        intelligence::try_ask_advisor(service.as_ref(), &query, &context).await
    })
}

pub fn spawn_alerts(
    service: Arc<dyn TextService>,
    state: SharedState,
    today: NaiveDate,
) -> CallSlot<Vec<Alert>> {
    let metrics = FarmMetrics::from_state(&state.lock(), today);
    spawn_call("alerts", async move {
        intelligence::try_generate_alerts(service.as_ref(), &metrics).await
    })
}

/// Emails never fail at the call level; delivery status lives in the record.
pub fn spawn_email(sink: Arc<dyn EmailSink>, message: EmailMessage) -> CallSlot<EmailRecord> {
    spawn_call("email", async move { Ok(sink.send(message).await) })
}
