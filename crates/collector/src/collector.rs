//! Fan-out/fan-in execution of a data-collection plan.
//!
//! One task per unique spec; per-provider pacing through the rate limiter;
//! per-spec timeouts; peer failures isolated; cancellation observed before
//! every upstream initiation. The returned bundle is canonicalized (per-kind
//! lists sorted by key) so nothing downstream depends on completion order.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use tw_domain::config::{LimitsConfig, ProviderKey};
use tw_domain::plan::{PlanSpec, ServiceCallSpec};
use tw_domain::result::{ResultBundle, ServiceResult};
use tw_domain::{Error, ErrorKind};
use tw_providers::RequestCtx;

use crate::limiter::RateLimiter;
use crate::router::ServiceRouter;

/// Executes plans against the upstream fleet.
pub struct DataCollector {
    router: Arc<ServiceRouter>,
    limiter: Arc<RateLimiter>,
    limits: LimitsConfig,
}

impl DataCollector {
    pub fn new(router: Arc<ServiceRouter>, limiter: Arc<RateLimiter>, limits: LimitsConfig) -> Self {
        Self {
            router,
            limiter,
            limits,
        }
    }

    /// Run every spec of `plan` and collect exactly one result per unique
    /// `(kind, key)` pair.
    ///
    /// Never fails as a whole: errors, timeouts, and cancellations become
    /// `Err` entries in the bundle while peers keep running.
    pub async fn collect(&self, plan: &PlanSpec, ctx: &RequestCtx) -> ResultBundle {
        // One upstream call per (kind, key): later duplicates observe the
        // first spec's result by never being dispatched at all.
        let mut unique: Vec<ServiceCallSpec> = Vec::with_capacity(plan.specs.len());
        for spec in &plan.specs {
            if !unique.iter().any(|s| s.dedup_key() == spec.dedup_key()) {
                unique.push(spec.clone());
            }
        }

        // Higher priority dispatches first; the limiter turns spawn order
        // into grant order within each provider.
        unique.sort_by(|a, b| b.priority.cmp(&a.priority));

        tracing::debug!(specs = unique.len(), "collection started");

        let mut tasks: JoinSet<ServiceResult> = JoinSet::new();
        for spec in unique {
            let router = Arc::clone(&self.router);
            let limiter = Arc::clone(&self.limiter);
            let timeout = Duration::from_millis(self.limits.timeout_ms(spec.kind));
            let ctx = ctx.clone();
            tasks.spawn(async move { run_spec(spec, router, limiter, timeout, ctx).await });
        }

        let mut bundle = ResultBundle::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => bundle.push(result),
                Err(err) => {
                    // A panicked task loses its spec identity; log and move on.
                    tracing::error!(error = %err, "collection task failed to join");
                }
            }
        }

        bundle.canonicalize();
        tracing::debug!(results = bundle.total(), "collection finished");
        bundle
    }
}

/// Run one spec end to end: limiter slot, cancellation check, timed call.
async fn run_spec(
    spec: ServiceCallSpec,
    router: Arc<ServiceRouter>,
    limiter: Arc<RateLimiter>,
    timeout: Duration,
    ctx: RequestCtx,
) -> ServiceResult {
    let provider = ProviderKey::for_kind(spec.kind);

    if let Err(err) = limiter.acquire(provider, &ctx).await {
        return err_result(&spec, &err);
    }

    // A cancel that landed while we waited must suppress the call.
    if ctx.is_canceled() {
        return err_result(&spec, &Error::Canceled);
    }

    let budget = ctx.clamp_timeout(timeout);
    match tokio::time::timeout(budget, router.dispatch(&spec, &ctx)).await {
        Ok(Ok(payload)) => ServiceResult::Ok {
            kind: spec.kind,
            key: spec.key,
            payload,
        },
        Ok(Err(err)) => err_result(&spec, &err),
        Err(_) => ServiceResult::Err {
            kind: spec.kind,
            key: spec.key,
            err: ErrorKind::Timeout,
            detail: format!("call exceeded {}ms", budget.as_millis()),
        },
    }
}

fn err_result(spec: &ServiceCallSpec, err: &Error) -> ServiceResult {
    ServiceResult::Err {
        kind: spec.kind,
        key: spec.key.clone(),
        err: err.kind(),
        detail: err.to_string(),
    }
}
