//! Publish fan-out, isolation and ambient context.

mod common;

use common::{Audit, FanoutA, FanoutB, FanoutC, Seen, Shipped, Strict, init_tracing};
use courier::testing::{FailingScopes, RecordingListener, TraceLog, TrackingScopes};
use courier::{
    AggregateError, BoxError, Candidate, ClientOptions, ConfigError, Container, CourierError,
    DispatchClient, DispatchError, Mediator, PublishContext, PublishOptions, ScopeFactory, Value,
    ambient,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

struct Listeners {
    a: RecordingListener<FanoutA>,
    c: RecordingListener<FanoutC>,
    shipped: RecordingListener<Shipped>,
    audits: Seen<Option<String>>,
}

impl Listeners {
    fn new() -> Self {
        Self {
            a: RecordingListener::new(),
            c: RecordingListener::new(),
            shipped: RecordingListener::new(),
            audits: Seen::default(),
        }
    }

    fn mediator(&self) -> Mediator {
        let audits = self.audits.clone();
        Mediator::builder()
            .notification_handler::<FanoutA, _>(self.a.clone())
            .notification_handler::<FanoutB, _>(|_: FanoutB| async move {
                Err::<(), BoxError>("listener b failed".into())
            })
            .notification_handler::<FanoutC, _>(self.c.clone())
            .notification_handler::<Shipped, _>(self.shipped.clone())
            .request_handler::<Audit, _>(move |_: Audit| {
                let audits = audits.clone();
                async move {
                    audits.push(ambient::current().map(|ctx| ctx.id().to_owned()));
                    Ok::<_, BoxError>(())
                }
            })
            .build()
    }
}

fn client(mediator: Mediator, scopes: Arc<dyn ScopeFactory>, options: ClientOptions) -> DispatchClient {
    DispatchClient::builder(mediator, scopes)
        .options(options)
        .listener(Candidate::notification::<FanoutA>())
        .listener(Candidate::notification::<FanoutB>())
        .listener(Candidate::notification::<FanoutC>())
        .listener(Candidate::notification::<Shipped>())
        .listener(Candidate::request::<Audit>())
        .build()
        .unwrap()
}

fn scopes() -> Arc<TrackingScopes> {
    Arc::new(TrackingScopes::new(Arc::new(Container::builder().build())))
}

// ============================================================================
// Fan-out
// ============================================================================

#[tokio::test]
async fn one_failing_listener_does_not_stop_the_others() {
    init_tracing();
    let listeners = Listeners::new();
    let client = client(listeners.mediator(), scopes(), ClientOptions::default());
    let failures = Seen::<usize>::default();

    let handle = client
        .publish_with(
            "fanout",
            &json!({ "n": 7 }),
            PublishOptions::new().on_error({
                let failures = failures.clone();
                move |error: &AggregateError, _: &Value, _: &PublishContext| failures.push(error.len())
            }),
        )
        .unwrap();
    let report = handle.wait().await;

    assert_eq!(report.listeners, 3);
    assert_eq!(report.dispatched, 3);
    assert_eq!(report.failures, 1);
    assert!(!report.is_clean());
    assert_eq!(failures.all(), vec![1]);
    assert_eq!(listeners.a.received()[0].notification, FanoutA { n: 7 });
    assert_eq!(listeners.c.received()[0].notification, FanoutC { n: 7 });
}

#[tokio::test]
async fn hooks_run_around_dispatch() {
    let listeners = Listeners::new();
    let client = client(listeners.mediator(), scopes(), ClientOptions::default());
    let log = TraceLog::new();

    let options = PublishOptions::new()
        .on_before({
            let log = log.clone();
            move |data: &Value, ctx: &PublishContext| log.push(format!("before {} {}", ctx.key(), data["n"]))
        })
        .on_complete({
            let log = log.clone();
            move |_: &Value, _: &PublishContext| log.push("complete")
        })
        .on_error({
            let log = log.clone();
            move |_: &AggregateError, _: &Value, _: &PublishContext| log.push("error")
        });
    client
        .publish_with("fanout", &json!({ "n": 1 }), options)
        .unwrap()
        .wait()
        .await;

    assert_eq!(log.entries(), vec!["before fanout 1", "complete", "error"]);
}

#[tokio::test]
async fn panicking_hook_does_not_abort_dispatched_listeners() {
    let listeners = Listeners::new();
    let client = client(listeners.mediator(), scopes(), ClientOptions::default());
    let failures = Seen::<usize>::default();

    let options = PublishOptions::new()
        .on_complete(|_: &Value, _: &PublishContext| panic!("complete hook exploded"))
        .on_error({
            let failures = failures.clone();
            move |error: &AggregateError, _: &Value, _: &PublishContext| failures.push(error.len())
        });
    let report = client
        .publish_with("fanout", &json!({ "n": 4 }), options)
        .unwrap()
        .wait()
        .await;

    assert_eq!(report.key, "fanout");
    assert_eq!(report.dispatched, 3);
    assert_eq!(report.failures, 1);
    assert_eq!(report.hook_failures, 1);
    assert_eq!(failures.all(), vec![1]);
    assert_eq!(listeners.a.count(), 1);
    assert_eq!(listeners.c.count(), 1);
}

#[tokio::test]
async fn slow_listener_survives_a_panicking_hook() {
    let done = TraceLog::new();
    let mediator = Mediator::builder()
        .request_handler::<Audit, _>({
            let done = done.clone();
            move |request: Audit| {
                let done = done.clone();
                async move {
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    done.push(request.order);
                    Ok::<_, BoxError>(())
                }
            }
        })
        .build();
    let client = DispatchClient::builder(mediator, scopes())
        .listener(Candidate::request::<Audit>())
        .build()
        .unwrap();

    let report = client
        .publish_with(
            "orders.shipped",
            &json!({ "order": "o-5" }),
            PublishOptions::new().on_before(|_: &Value, _: &PublishContext| panic!("before hook exploded")),
        )
        .unwrap()
        .wait()
        .await;

    assert_eq!(report.dispatched, 1);
    assert_eq!(report.hook_failures, 1);
    assert!(!report.is_clean());
    assert_eq!(done.entries(), vec!["o-5"]);
}

#[tokio::test]
async fn error_hook_is_silent_when_everything_succeeds() {
    let listeners = Listeners::new();
    let client = client(listeners.mediator(), scopes(), ClientOptions::default());
    let log = TraceLog::new();

    let report = client
        .publish_with(
            "orders.shipped",
            &json!({ "order": "o-1" }),
            PublishOptions::new().on_error({
                let log = log.clone();
                move |_: &AggregateError, _: &Value, _: &PublishContext| log.push("error")
            }),
        )
        .unwrap()
        .wait()
        .await;

    assert!(report.is_clean());
    assert_eq!(report.dispatched, 2);
    assert!(log.is_empty());
    assert_eq!(listeners.audits.all().len(), 1);
}

#[tokio::test]
async fn publish_returns_before_listeners_finish() {
    let gate = Arc::new(Notify::new());
    let done = TraceLog::new();
    let mediator = Mediator::builder()
        .request_handler::<Audit, _>({
            let gate = Arc::clone(&gate);
            let done = done.clone();
            move |request: Audit| {
                let gate = Arc::clone(&gate);
                let done = done.clone();
                async move {
                    gate.notified().await;
                    done.push(request.order);
                    Ok::<_, BoxError>(())
                }
            }
        })
        .build();
    let client = DispatchClient::builder(mediator, scopes())
        .listener(Candidate::request::<Audit>())
        .build()
        .unwrap();

    let handle = client
        .publish("orders.shipped", &json!({ "order": "o-9" }))
        .unwrap();
    assert!(!handle.is_finished());
    assert!(done.is_empty());

    gate.notify_one();
    let report = handle.wait().await;
    assert!(report.is_clean());
    assert_eq!(done.entries(), vec!["o-9"]);
}

#[tokio::test]
async fn key_without_listeners_is_not_an_error() {
    let listeners = Listeners::new();
    let client = client(listeners.mediator(), scopes(), ClientOptions::default());
    let log = TraceLog::new();

    let handle = client
        .publish_with(
            "nobody.listens",
            &json!({ "n": 1 }),
            PublishOptions::new().on_before({
                let log = log.clone();
                move |_: &Value, _: &PublishContext| log.push("before")
            }),
        )
        .unwrap();

    assert!(handle.is_finished());
    let report = handle.wait().await;
    assert_eq!(report.key, "nobody.listens");
    assert_eq!(report.listeners, 0);
    assert_eq!(report.dispatched, 0);
    assert!(log.is_empty());
}

#[tokio::test]
async fn listener_that_cannot_read_the_event_is_skipped() {
    let listeners = Listeners::new();
    let client = DispatchClient::builder(listeners.mediator(), scopes())
        .listener(Candidate::notification::<FanoutA>())
        .listener(Candidate::notification::<Strict>())
        .listener(Candidate::notification::<FanoutC>())
        .build()
        .unwrap();

    let report = client
        .publish("fanout", &json!({ "n": 3 }))
        .unwrap()
        .wait()
        .await;

    assert_eq!(report.listeners, 3);
    assert_eq!(report.translation_failures, 1);
    assert_eq!(report.dispatched, 2);
    assert_eq!(report.failures, 0);
    assert_eq!(listeners.a.count(), 1);
    assert_eq!(listeners.c.count(), 1);
}

#[tokio::test]
async fn invalid_events_are_rejected_up_front() {
    let listeners = Listeners::new();
    let client = client(listeners.mediator(), scopes(), ClientOptions::default());

    let err = client.publish("fanout", &Value::Null).unwrap_err();
    assert!(matches!(err, CourierError::Config(ConfigError::NullArgument("event"))));
}

#[test]
fn publish_outside_a_runtime_fails() {
    let listeners = Listeners::new();
    let client = client(listeners.mediator(), scopes(), ClientOptions::default());

    let err = client.publish("fanout", &json!({ "n": 1 })).unwrap_err();
    assert!(matches!(err, CourierError::Dispatch(DispatchError::NoRuntime)));
    assert_eq!(listeners.a.count(), 0);
}

// ============================================================================
// Scopes
// ============================================================================

#[tokio::test]
async fn each_publish_gets_one_scope_released_afterwards() {
    let listeners = Listeners::new();
    let scopes = scopes();
    let client = client(listeners.mediator(), scopes.clone(), ClientOptions::default());

    for n in 0..3 {
        client
            .publish("fanout", &json!({ "n": n }))
            .unwrap()
            .wait()
            .await;
    }

    assert_eq!(scopes.opened(), 3);
    assert_eq!(scopes.live(), 0);
}

#[tokio::test]
async fn scope_failure_skips_every_listener() {
    let listeners = Listeners::new();
    let client = client(listeners.mediator(), Arc::new(FailingScopes), ClientOptions::default());

    let report = client
        .publish("fanout", &json!({ "n": 1 }))
        .unwrap()
        .wait()
        .await;

    assert!(report.scope_failed);
    assert_eq!(report.dispatched, 0);
    assert_eq!(listeners.a.count(), 0);
    assert_eq!(listeners.c.count(), 0);
}

// ============================================================================
// Ambient Context
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_publishes_see_their_own_context() {
    let listeners = Listeners::new();
    let options = ClientOptions {
        default_headers: HashMap::from([
            ("source".to_owned(), "tests".to_owned()),
            ("tenant".to_owned(), "default".to_owned()),
        ]),
        ..ClientOptions::default()
    };
    let client = client(listeners.mediator(), scopes(), options);

    let first = client
        .publish_with(
            "orders.shipped",
            &json!({ "order": "o-1" }),
            PublishOptions::new().header("tenant", "north"),
        )
        .unwrap();
    let second = client
        .publish_with(
            "orders.shipped",
            &json!({ "order": "o-2" }),
            PublishOptions::new().header("tenant", "south"),
        )
        .unwrap();
    let ids = [first.context_id().to_owned(), second.context_id().to_owned()];
    assert_ne!(ids[0], ids[1]);

    first.wait().await;
    second.wait().await;

    let received = listeners.shipped.received();
    assert_eq!(received.len(), 2);
    for entry in &received {
        let (expected_id, tenant) = match entry.notification.order.as_str() {
            "o-1" => (&ids[0], "north"),
            _ => (&ids[1], "south"),
        };
        assert_eq!(entry.context_id.as_ref(), Some(expected_id));
        assert_eq!(
            entry.headers,
            vec![
                ("source".to_owned(), "tests".to_owned()),
                ("tenant".to_owned(), tenant.to_owned()),
            ]
        );
    }

    let mut audits: Vec<String> = listeners.audits.all().into_iter().flatten().collect();
    audits.sort();
    let mut expected = ids.to_vec();
    expected.sort();
    assert_eq!(audits, expected);

    assert!(ambient::current().is_none());
}

#[tokio::test]
async fn listeners_of_one_publish_share_its_context() {
    let listeners = Listeners::new();
    let client = client(listeners.mediator(), scopes(), ClientOptions::default());

    let handle = client.publish("fanout", &json!({ "n": 2 })).unwrap();
    let id = handle.context_id().to_owned();
    handle.wait().await;

    let a = &listeners.a.received()[0];
    let c = &listeners.c.received()[0];
    assert_eq!(a.context_id.as_deref(), Some(id.as_str()));
    assert_eq!(c.context_id.as_deref(), Some(id.as_str()));
    assert_eq!(a.key.as_deref(), Some("fanout"));
    assert_eq!(c.key, a.key);
    assert!(a.timestamp.is_some_and(|ts| ts > 0));
    assert_eq!(c.timestamp, a.timestamp);
}
