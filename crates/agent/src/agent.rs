//! Turn execution: validate, extract, think, plan, collect, compose, record.

use std::sync::Arc;

use tracing::Instrument;

use tw_collector::{DataCollector, RateLimiter, ServiceRouter};
use tw_compose::AnswerComposer;
use tw_domain::config::Config;
use tw_domain::extracted::Extracted;
use tw_domain::turn::{TurnRecord, Utterance};
use tw_domain::{Error, Result, Thought};
use tw_extract::{ContextExtractor, KeywordExtractor};
use tw_providers::{AmapClient, ArkReasoner, Reasoner, RequestCtx};
use tw_reasoning::{resolve_plan, ThoughtChainBuilder};
use tw_sessions::{SessionStore, UserLockMap};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Options and response
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-call options for [`TravelAgent::handle`].
#[derive(Debug, Clone, Default)]
pub struct HandleOptions {
    /// Return the thought chain and extracted context alongside the answer.
    pub include_thoughts: bool,
    /// Overall wall-time budget for the turn.
    pub deadline: Option<tokio::time::Instant>,
    /// Caller-owned request context; lets the caller cancel a running turn.
    pub ctx: Option<RequestCtx>,
}

/// What one turn returns to the caller.
#[derive(Debug, Clone)]
pub struct HandleResponse {
    pub answer: String,
    pub thoughts: Option<Vec<Thought>>,
    pub extracted: Option<Extracted>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TravelAgent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The reasoning and orchestration core, wired and ready for turns.
pub struct TravelAgent {
    config: Config,
    keyword_extractor: KeywordExtractor,
    context_extractor: ContextExtractor,
    chain_builder: ThoughtChainBuilder,
    collector: DataCollector,
    composer: AnswerComposer,
    reasoner: Arc<dyn Reasoner>,
    sessions: SessionStore,
    locks: UserLockMap,
}

impl TravelAgent {
    /// Wire the core with injected collaborators.
    ///
    /// Tests inject mocks here; production callers can use
    /// [`TravelAgent::from_config`] instead.
    pub fn new(config: Config, reasoner: Arc<dyn Reasoner>, router: Arc<ServiceRouter>) -> Self {
        let limiter = Arc::new(RateLimiter::new(&config.limits));
        let collector = DataCollector::new(router, limiter, config.limits.clone());
        Self {
            keyword_extractor: KeywordExtractor::new(&config.core),
            context_extractor: ContextExtractor::new(),
            chain_builder: ThoughtChainBuilder::new(&config.core),
            composer: AnswerComposer::new(&config.core),
            sessions: SessionStore::new(config.core.max_history_turns),
            locks: UserLockMap::new(config.core.max_concurrent_requests_per_user),
            collector,
            reasoner,
            config,
        }
    }

    /// Wire the core against the real Ark and Amap adapters.
    pub fn from_config(config: Config) -> Result<Self> {
        let reasoner = Arc::new(ArkReasoner::from_config(&config.reasoner)?);
        let amap = Arc::new(AmapClient::from_config(&config.amap)?);
        let router = Arc::new(ServiceRouter {
            weather: amap.clone(),
            poi: amap.clone(),
            navigation: amap.clone(),
            traffic: amap.clone(),
            hints: amap,
        });
        Ok(Self::new(config, reasoner, router))
    }

    /// Session state, exposed for callers that render history.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Run one turn for `user_id`.
    ///
    /// Only invalid input, cancellation, and internal violations surface as
    /// errors; upstream trouble degrades the answer instead.
    pub async fn handle(
        &self,
        user_id: &str,
        text: &str,
        opts: HandleOptions,
    ) -> Result<HandleResponse> {
        if user_id.trim().is_empty() {
            return Err(Error::InvalidInput("user id is empty".into()));
        }
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("utterance is empty".into()));
        }

        let mut ctx = opts.ctx.clone().unwrap_or_default();
        if let Some(deadline) = opts.deadline {
            ctx = ctx.deadline_at(deadline);
        }

        let utterance = Utterance::new(user_id, text);
        let span = tracing::info_span!("turn", user_id, chars = text.len());
        self.run_turn(utterance, opts, ctx).instrument(span).await
    }

    async fn run_turn(
        &self,
        utterance: Utterance,
        opts: HandleOptions,
        ctx: RequestCtx,
    ) -> Result<HandleResponse> {
        let user_id = utterance.user_id.clone();
        let text = utterance.text.clone();

        // One turn at a time per user; different users run in parallel.
        let _permit = self.locks.acquire(&user_id).await?;

        let history = self.sessions.load(&user_id);
        let mut record = TurnRecord::begin(utterance);

        // Pure extraction first; nothing upstream has been touched yet.
        let keywords = self.keyword_extractor.extract(&text);
        let context = self.context_extractor.extract(&text);
        let mut extracted = Extracted {
            keywords: keywords.keywords,
            locations: keywords.locations,
            activities: keywords.activities,
            days: keywords.days,
            route: keywords.route,
            times_of_day: keywords.times_of_day,
            companions: context.companions,
            emotion: context.emotion,
            budget: context.budget,
            preferences: context.preferences,
            intent_summary: String::new(),
        };

        let thoughts = self
            .chain_builder
            .build(&text, &extracted, self.reasoner.as_ref(), &ctx)
            .await;

        let plan = resolve_plan(&thoughts, &extracted, &self.config.core.region);
        tracing::info!(
            specs = plan.specs.len(),
            thoughts = thoughts.len(),
            "turn planned"
        );

        let bundle = self.collector.collect(&plan, &ctx).await;
        if ctx.is_canceled() {
            return Err(Error::Canceled);
        }

        extracted.intent_summary = self
            .composer
            .summarize_intent(&text, &extracted, self.reasoner.as_ref(), &ctx)
            .await;

        let (answer, _analysis) = self
            .composer
            .compose(
                &text,
                &extracted,
                &bundle,
                &history,
                self.reasoner.as_ref(),
                &ctx,
            )
            .await;
        if ctx.is_canceled() {
            return Err(Error::Canceled);
        }

        record.thoughts = thoughts.clone();
        record.extracted = extracted.clone();
        record.plan = plan;
        record.results = bundle;
        record.finish(answer.clone());
        self.sessions.append(&user_id, record)?;

        Ok(HandleResponse {
            answer,
            thoughts: opts.include_thoughts.then_some(thoughts),
            extracted: opts.include_thoughts.then_some(extracted),
        })
    }
}
