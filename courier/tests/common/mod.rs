#![allow(dead_code)]

use courier::behaviors::{Authorization, Authorizer};
use courier::testing::TraceLog;
use courier::{
    BehaviorId, BoxError, Filter, FilterNext, FilterType, Message, Notification, Payload, Request,
    RequestContext, ResolverExt, Routable,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Requests
// ============================================================================

/// Declares three behaviors, deliberately not in alphabetical order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ordered {
    pub value: String,
}

impl Message for Ordered {}

impl Request for Ordered {
    type Response = String;

    fn behaviors() -> &'static [BehaviorId] {
        &["third", "first", "second"]
    }
}

impl Routable for Ordered {
    fn routes() -> &'static [&'static str] {
        &["ordered"]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetOrder {
    #[serde(rename = "Id")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    #[serde(rename = "Id")]
    pub id: String,
    pub status: String,
}

impl Message for GetOrder {}
impl Message for OrderView {}

impl Request for GetOrder {
    type Response = OrderView;
}

impl Routable for GetOrder {
    fn routes() -> &'static [&'static str] {
        &["orders/get", "orders/fetch"]
    }
}

pub async fn get_order(request: GetOrder) -> Result<OrderView, BoxError> {
    Ok(OrderView {
        id: request.id,
        status: "shipped".into(),
    })
}

/// Claims a route already taken by [`GetOrder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOrderV2 {
    #[serde(rename = "Id")]
    pub id: String,
}

impl Message for GetOrderV2 {}

impl Request for GetOrderV2 {
    type Response = OrderView;
}

impl Routable for GetOrderV2 {
    fn routes() -> &'static [&'static str] {
        &["orders/get"]
    }
}

/// Adds a fresh route before clashing with [`GetOrder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOrderV3 {
    #[serde(rename = "Id")]
    pub id: String,
}

impl Message for GetOrderV3 {}

impl Request for GetOrderV3 {
    type Response = OrderView;
}

impl Routable for GetOrderV3 {
    fn routes() -> &'static [&'static str] {
        &["orders/lookup", "orders/get"]
    }
}

/// Carries a filter that tags the inbound id and the outbound reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tagged {
    #[serde(rename = "Id")]
    pub id: String,
}

impl Message for Tagged {}

impl Request for Tagged {
    type Response = String;
}

impl Routable for Tagged {
    fn routes() -> &'static [&'static str] {
        &["tagged"]
    }

    fn filters() -> Vec<FilterType> {
        vec![FilterType::of::<TagFilter>()]
    }
}

/// Routed with a type-declared [`InnerFilter`], plus whatever the test adds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layered {
    pub value: u32,
}

impl Message for Layered {}

impl Request for Layered {
    type Response = u32;
}

impl Routable for Layered {
    fn routes() -> &'static [&'static str] {
        &["layered"]
    }

    fn filters() -> Vec<FilterType> {
        vec![FilterType::of::<InnerFilter>()]
    }
}

/// Produces no value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fire {
    pub target: String,
}

impl Message for Fire {}

impl Request for Fire {
    type Response = ();
}

impl Routable for Fire {
    fn routes() -> &'static [&'static str] {
        &["fire"]
    }
}

/// Produces an explicitly empty value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lookup {
    pub name: String,
}

impl Message for Lookup {}

impl Request for Lookup {
    type Response = Option<String>;
}

impl Routable for Lookup {
    fn routes() -> &'static [&'static str] {
        &["lookup"]
    }
}

/// Guarded by authorization and validation behaviors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub account: String,
    pub amount: i64,
}

impl Message for Transfer {}

impl Request for Transfer {
    type Response = String;

    fn behaviors() -> &'static [BehaviorId] {
        &["authorization", "validation"]
    }
}

impl Routable for Transfer {
    fn routes() -> &'static [&'static str] {
        &["transfer"]
    }
}

pub struct DenyAccount(pub &'static str);

impl Authorizer<Transfer> for DenyAccount {
    async fn authorize(&self, request: &Transfer) -> Authorization {
        if request.account == self.0 {
            Authorization::Denied(format!("account {} is frozen", self.0))
        } else {
            Authorization::Granted
        }
    }
}

/// Sleeps for `millis` before answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slow {
    pub millis: u64,
}

impl Message for Slow {}

impl Request for Slow {
    type Response = u64;
}

impl Routable for Slow {
    fn routes() -> &'static [&'static str] {
        &["slow"]
    }

    fn filters() -> Vec<FilterType> {
        vec![FilterType::of::<courier::filters::TimeoutFilter<50>>()]
    }
}

pub async fn slow(request: Slow) -> Result<u64, BoxError> {
    tokio::time::sleep(Duration::from_millis(request.millis)).await;
    Ok(request.millis)
}

/// A request type without routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unrouted;

impl Message for Unrouted {}

impl Request for Unrouted {
    type Response = ();
}

impl Routable for Unrouted {}

/// A request type declaring an empty route key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlankRoute;

impl Message for BlankRoute {}

impl Request for BlankRoute {
    type Response = ();
}

impl Routable for BlankRoute {
    fn routes() -> &'static [&'static str] {
        &["fine", ""]
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipped {
    pub order: String,
}

impl Message for Shipped {}
impl Notification for Shipped {}

impl Routable for Shipped {
    fn listen_keys() -> &'static [&'static str] {
        &["orders.shipped"]
    }
}

macro_rules! fanout_listener {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub n: u32,
        }

        impl Message for $name {}
        impl Notification for $name {}

        impl Routable for $name {
            fn listen_keys() -> &'static [&'static str] {
                &["fanout"]
            }
        }
    };
}

fanout_listener!(FanoutA);
fanout_listener!(FanoutB);
fanout_listener!(FanoutC);

/// Listens on `fanout` but needs a field the event does not carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strict {
    pub n: u32,
    pub required: String,
}

impl Message for Strict {}
impl Notification for Strict {}

impl Routable for Strict {
    fn listen_keys() -> &'static [&'static str] {
        &["fanout"]
    }
}

/// A request type listening on a publish key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audit {
    pub order: String,
}

impl Message for Audit {}

impl Request for Audit {
    type Response = ();
}

impl Routable for Audit {
    fn listen_keys() -> &'static [&'static str] {
        &["orders.shipped"]
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Appends `" Req"` to the inbound [`Tagged`] id and `" Res"` to the reply.
#[derive(Default)]
pub struct TagFilter;

impl Filter for TagFilter {
    async fn invoke(
        &self,
        ctx: &mut RequestContext,
        mut payload: Payload,
        next: FilterNext<'_>,
    ) -> Result<Payload, BoxError> {
        if let Some(request) = payload.downcast_mut::<Tagged>() {
            request.id.push_str(" Req");
        }
        let mut result = next.run(ctx, payload).await?;
        if let Some(reply) = result.downcast_mut::<String>() {
            reply.push_str(" Res");
        }
        Ok(result)
    }
}

async fn logged(
    name: &str,
    ctx: &mut RequestContext,
    payload: Payload,
    next: FilterNext<'_>,
) -> Result<Payload, BoxError> {
    let log = ctx.resolver().resolve::<TraceLog>();
    if let Some(log) = &log {
        log.push(format!("{name}-in"));
    }
    let result = next.run(ctx, payload).await;
    if let Some(log) = &log {
        log.push(format!("{name}-out"));
    }
    result
}

/// Logs to the [`TraceLog`] registered in the resolver.
#[derive(Default)]
pub struct OuterFilter;

impl Filter for OuterFilter {
    async fn invoke(
        &self,
        ctx: &mut RequestContext,
        payload: Payload,
        next: FilterNext<'_>,
    ) -> Result<Payload, BoxError> {
        logged("outer", ctx, payload, next).await
    }
}

/// Logs to the [`TraceLog`] registered in the resolver.
#[derive(Default)]
pub struct InnerFilter;

impl Filter for InnerFilter {
    async fn invoke(
        &self,
        ctx: &mut RequestContext,
        payload: Payload,
        next: FilterNext<'_>,
    ) -> Result<Payload, BoxError> {
        logged("inner", ctx, payload, next).await
    }
}

/// Answers without calling the rest of the chain.
#[derive(Default)]
pub struct ShortCircuit;

impl Filter for ShortCircuit {
    async fn invoke(
        &self,
        _ctx: &mut RequestContext,
        _payload: Payload,
        _next: FilterNext<'_>,
    ) -> Result<Payload, BoxError> {
        Ok(Payload::new(0_u32))
    }
}

// ============================================================================
// Shared state
// ============================================================================

/// Records every value a handler saw.
#[derive(Clone, Default)]
pub struct Seen<T>(pub Arc<Mutex<Vec<T>>>);

impl<T: Clone> Seen<T> {
    pub fn push(&self, value: T) {
        self.0.lock().unwrap().push(value);
    }

    pub fn all(&self) -> Vec<T> {
        self.0.lock().unwrap().clone()
    }
}
