//! Publish fan-out.

use crate::ambient;
use crate::client::options::PublishOptions;
use crate::mediator::Mediator;
use crate::routing::RouteDescriptor;
use courier_core::{AggregateError, BoxError, PublishContext, ScopeFactory};
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Outcome of one publish occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Identifier of the occurrence's context.
    pub context_id: String,
    /// The published key.
    pub key: String,
    /// Listeners registered for the key.
    pub listeners: usize,
    /// Listeners whose dispatch was started.
    pub dispatched: usize,
    /// Listeners skipped because the event did not fit their payload type.
    pub translation_failures: usize,
    /// Dispatched listeners that failed or panicked.
    pub failures: usize,
    /// The resolution scope could not be created, so nothing ran.
    pub scope_failed: bool,
    /// Hooks that panicked.
    pub hook_failures: usize,
}

impl PublishReport {
    fn new(context: &PublishContext, listeners: usize) -> Self {
        Self {
            context_id: context.id().to_owned(),
            key: context.key().to_owned(),
            listeners,
            ..Self::default()
        }
    }

    /// Returns `true` if every listener was dispatched and succeeded.
    pub fn is_clean(&self) -> bool {
        !self.scope_failed
            && self.translation_failures == 0
            && self.failures == 0
            && self.hook_failures == 0
            && self.dispatched == self.listeners
    }
}

/// Handle to a publish occurrence running in the background.
///
/// Dropping the handle does not stop the occurrence.
#[derive(Debug)]
pub struct PublishHandle {
    report: Option<PublishReport>,
    context_id: String,
    task: Option<JoinHandle<PublishReport>>,
}

impl PublishHandle {
    pub(crate) fn spawned(context_id: String, task: JoinHandle<PublishReport>) -> Self {
        Self {
            report: None,
            context_id,
            task: Some(task),
        }
    }

    pub(crate) fn finished(report: PublishReport) -> Self {
        Self {
            context_id: report.context_id.clone(),
            report: Some(report),
            task: None,
        }
    }

    /// Identifier of the occurrence's context.
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    /// Returns `true` once every listener has completed.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits for every listener to complete.
    pub async fn wait(self) -> PublishReport {
        match (self.report, self.task) {
            (Some(report), _) => report,
            (None, Some(task)) => match task.await {
                Ok(report) => report,
                Err(err) => {
                    tracing::error!(context = %self.context_id, error = %err, "publish task aborted");
                    PublishReport {
                        context_id: self.context_id,
                        ..PublishReport::default()
                    }
                }
            },
            (None, None) => PublishReport {
                context_id: self.context_id,
                ..PublishReport::default()
            },
        }
    }
}

/// Everything one occurrence needs once it leaves the caller.
pub(crate) struct Fanout {
    pub(crate) data: Value,
    pub(crate) listeners: Vec<RouteDescriptor>,
    pub(crate) context: Arc<PublishContext>,
    pub(crate) options: PublishOptions,
    pub(crate) mediator: Mediator,
    pub(crate) scopes: Arc<dyn ScopeFactory>,
}

impl Fanout {
    pub(crate) fn empty_report(&self) -> PublishReport {
        PublishReport::new(&self.context, self.listeners.len())
    }

    pub(crate) async fn run(self) -> PublishReport {
        let span = tracing::info_span!(
            "publish",
            key = %self.context.key(),
            context = %self.context.id(),
            listeners = self.listeners.len(),
        );
        self.occurrence().instrument(span).await
    }

    async fn occurrence(self) -> PublishReport {
        let mut report = self.empty_report();

        let scope = match self.scopes.create_scope() {
            Ok(scope) => scope,
            Err(err) => {
                tracing::error!(error = %err, "failed to create publish scope; no listener will run");
                report.scope_failed = true;
                return report;
            }
        };
        let mediator = self.mediator.with_resolver(scope);

        let context = Some(Arc::clone(&self.context));
        ambient::scope(context, self.dispatch(&mediator, &mut report)).await;

        drop(mediator);
        tracing::debug!(
            dispatched = report.dispatched,
            failures = report.failures,
            hook_failures = report.hook_failures,
            "publish completed"
        );
        report
    }

    async fn dispatch(&self, mediator: &Mediator, report: &mut PublishReport) {
        if let Some(hook) = &self.options.on_before {
            report.hook_failures += guard("on_before", || hook(&self.data, &self.context));
        }

        let mut tasks = JoinSet::new();
        for listener in &self.listeners {
            let payload = match listener.invoker().decode(self.data.clone()) {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::error!(
                        listener = listener.payload().name(),
                        error = %err,
                        "event does not fit listener; skipped"
                    );
                    report.translation_failures += 1;
                    continue;
                }
            };

            let route = listener.clone();
            let mediator = mediator.clone();
            ambient::spawn_in(&mut tasks, async move {
                let cancel = CancellationToken::new();
                route
                    .invoker()
                    .dispatch(&mediator, payload, &cancel)
                    .await
                    .map(drop)
            });
            report.dispatched += 1;
        }

        if let Some(hook) = &self.options.on_complete {
            report.hook_failures += guard("on_complete", || hook(&self.data, &self.context));
        }

        let mut failures: Vec<BoxError> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => failures.push(err),
                Err(err) => failures.push(Box::new(err)),
            }
        }

        if !failures.is_empty() {
            let error = AggregateError::new(failures);
            report.failures = error.len();
            tracing::error!(error = %error, "listeners failed");
            if let Some(hook) = &self.options.on_error {
                report.hook_failures += guard("on_error", || hook(&error, &self.data, &self.context));
            }
        }
    }
}

/// Runs a publish hook, containing any panic. Returns the number of panics.
fn guard(stage: &'static str, hook: impl FnOnce()) -> usize {
    match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(()) => 0,
        Err(payload) => {
            tracing::error!(stage, panic = panic_message(payload.as_ref()), "publish hook panicked");
            1
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
