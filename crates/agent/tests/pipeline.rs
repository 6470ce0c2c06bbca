//! End-to-end turns against mock collaborators: extraction, planning,
//! collection, composition, and session bookkeeping.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use tokio::time::Instant;

use tw_agent::{HandleOptions, TravelAgent};
use tw_collector::ServiceRouter;
use tw_domain::config::Config;
use tw_domain::context::{Avoidance, BudgetLevel, Companions, Mood};
use tw_domain::payload::{DailyForecast, LocationHint, Poi, RouteCandidate, TrafficStatus};
use tw_domain::{Error, Result, ServiceKind};
use tw_providers::{
    ChatMessage, HintsClient, NavigationClient, PoiClient, Reasoner, RequestCtx, TrafficClient,
    TravelMode, WeatherClient,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mock collaborators
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Scripted Reasoner: fails outright or returns a fixed response.
struct MockReasoner {
    fail: bool,
    response: String,
    calls: AtomicUsize,
}

impl MockReasoner {
    fn failing() -> Self {
        Self {
            fail: true,
            response: String::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn saying(response: &str) -> Self {
        Self {
            fail: false,
            response: response.into(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl Reasoner for MockReasoner {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _system: Option<&str>,
        _ctx: &RequestCtx,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(Error::Transport("reasoner down".into()))
        } else {
            Ok(self.response.clone())
        }
    }
}

/// One mock network standing in for every upstream client.
#[derive(Default)]
struct MockNet {
    delay_ms: u64,
    weather_fail: bool,
    log: StdMutex<Vec<(ServiceKind, Instant)>>,
}

impl MockNet {
    async fn call(&self, kind: ServiceKind, ctx: &RequestCtx) -> Result<()> {
        self.log.lock().unwrap().push((kind, Instant::now()));
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(self.delay_ms)) => {}
            _ = ctx.cancelled() => return Err(Error::Canceled),
        }
        Ok(())
    }

    fn initiations(&self, kind: ServiceKind) -> Vec<Instant> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, t)| *t)
            .collect()
    }

    fn total_initiations(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl WeatherClient for MockNet {
    async fn forecast(&self, _city: &str, ctx: &RequestCtx) -> Result<Vec<DailyForecast>> {
        self.call(ServiceKind::Weather, ctx).await?;
        if self.weather_fail {
            return Err(Error::Upstream {
                provider: "weather".into(),
                message: "forecast service offline".into(),
            });
        }
        Ok((0..7)
            .map(|i| DailyForecast {
                date: format!("2026-08-{:02}", i + 1),
                text: "晴".into(),
                temp_day_c: 28,
                temp_night_c: 22,
                ..Default::default()
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl PoiClient for MockNet {
    async fn search(
        &self,
        _keyword: &str,
        region: &str,
        _category: Option<&str>,
        _limit: usize,
        ctx: &RequestCtx,
    ) -> Result<Vec<Poi>> {
        self.call(ServiceKind::Poi, ctx).await?;
        Ok(vec![
            Poi {
                name: format!("{region}观景台"),
                category: "景区".into(),
                rating: Some(4.6),
                ..Default::default()
            },
            Poi {
                name: format!("{region}小馆"),
                category: "餐厅".into(),
                rating: Some(4.2),
                price: Some(120),
                ..Default::default()
            },
        ])
    }
}

#[async_trait::async_trait]
impl NavigationClient for MockNet {
    async fn route(
        &self,
        _origin: &str,
        _destination: &str,
        _mode: TravelMode,
        ctx: &RequestCtx,
    ) -> Result<Vec<RouteCandidate>> {
        self.call(ServiceKind::Navigation, ctx).await?;
        Ok(vec![RouteCandidate {
            distance_m: 4_200,
            duration_s: 20 * 60,
            description: "最快路线".into(),
            ..Default::default()
        }])
    }
}

#[async_trait::async_trait]
impl TrafficClient for MockNet {
    async fn status(&self, _area: &str, ctx: &RequestCtx) -> Result<TrafficStatus> {
        self.call(ServiceKind::Traffic, ctx).await?;
        Ok(TrafficStatus {
            description: "整体畅通".into(),
            ..Default::default()
        })
    }
}

#[async_trait::async_trait]
impl HintsClient for MockNet {
    async fn tips(
        &self,
        keyword: &str,
        _region: &str,
        _city_limit: bool,
        ctx: &RequestCtx,
    ) -> Result<Vec<LocationHint>> {
        self.call(ServiceKind::InputHints, ctx).await?;
        Ok(vec![LocationHint {
            name: keyword.into(),
            district: "测试区".into(),
            coord: "121.0,31.0".into(),
        }])
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Harness
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn agent_with(net: Arc<MockNet>, reasoner: Arc<MockReasoner>) -> TravelAgent {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let router = Arc::new(ServiceRouter {
        weather: net.clone(),
        poi: net.clone(),
        navigation: net.clone(),
        traffic: net.clone(),
        hints: net,
    });
    TravelAgent::new(Config::default(), reasoner, router)
}

fn with_thoughts() -> HandleOptions {
    HandleOptions {
        include_thoughts: true,
        ..Default::default()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scenario tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test(start_paused = true)]
async fn romantic_three_day_trip_extracts_and_plans() {
    let net = Arc::new(MockNet::default());
    let agent = agent_with(net.clone(), Arc::new(MockReasoner::failing()));

    let response = agent
        .handle(
            "u1",
            "Plan a 3-day romantic trip for me and my girlfriend, budget 20000, avoid crowded places",
            with_thoughts(),
        )
        .await
        .unwrap();

    let extracted = response.extracted.expect("extracted returned");
    assert_eq!(extracted.days, 3);
    assert!(matches!(extracted.companions, Companions::Romantic { .. }));
    assert!(extracted.emotion.moods.contains(&Mood::Romantic));
    assert!(extracted.emotion.avoid.contains(&Avoidance::Crowded));
    assert_eq!(extracted.budget.amount, Some(20_000));
    assert_eq!(extracted.budget.level, BudgetLevel::High);

    let session = agent.sessions().load("u1");
    let plan = &session.last().expect("turn recorded").plan;
    assert!(plan.count(ServiceKind::Weather) >= 3);
    let poi = &plan.of_kind(ServiceKind::Poi)[0];
    assert_eq!(poi.param("moods"), Some("romantic"));
    assert_eq!(poi.param("avoid"), Some("crowded"));
    assert_eq!(plan.count(ServiceKind::Navigation), 0);
}

#[tokio::test(start_paused = true)]
async fn route_question_plans_one_navigation_and_traffic_pair() {
    let net = Arc::new(MockNet::default());
    let agent = agent_with(net.clone(), Arc::new(MockReasoner::failing()));

    let response = agent
        .handle(
            "u2",
            "From People's Square to Xintiandi, how do I get there?",
            with_thoughts(),
        )
        .await
        .unwrap();

    let session = agent.sessions().load("u2");
    let plan = &session.last().unwrap().plan;
    assert_eq!(plan.count(ServiceKind::Navigation), 1);
    assert_eq!(plan.count(ServiceKind::Traffic), 1);
    // Single-day trip: one daily weather spec per mentioned location.
    assert_eq!(plan.count(ServiceKind::Weather), 2);
    assert_eq!(
        plan.of_kind(ServiceKind::Navigation)[0].key,
        "人民广场->新天地"
    );

    // The (deterministically composed) answer cites both dimensions.
    assert!(response.answer.contains("人民广场->新天地"));
    assert!(response.answer.contains("交通路线"));
    assert!(response.answer.contains("实时路况"));
    assert!(response.answer.contains("整体畅通"));
}

#[tokio::test(start_paused = true)]
async fn empty_utterance_is_invalid_and_touches_nothing() {
    let net = Arc::new(MockNet::default());
    let agent = agent_with(net.clone(), Arc::new(MockReasoner::failing()));

    let err = agent.handle("u3", "", HandleOptions::default()).await;
    assert!(matches!(err, Err(Error::InvalidInput(_))));

    let err = agent.handle("", "去外滩", HandleOptions::default()).await;
    assert!(matches!(err, Err(Error::InvalidInput(_))));

    assert_eq!(net.total_initiations(), 0);
    assert_eq!(agent.sessions().history_len("u3"), 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_the_turn_without_recording() {
    let net = Arc::new(MockNet {
        delay_ms: 5_000,
        ..Default::default()
    });
    let agent = agent_with(net.clone(), Arc::new(MockReasoner::failing()));

    let ctx = RequestCtx::new();
    let cancel_ctx = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel_ctx.cancel();
    });

    let opts = HandleOptions {
        ctx: Some(ctx),
        ..Default::default()
    };
    let result = agent.handle("u4", "去外滩和豫园玩", opts).await;
    assert!(matches!(result, Err(Error::Canceled)));
    assert_eq!(agent.sessions().history_len("u4"), 0);

    // Nothing new was initiated after the cancel landed.
    let initiated_at_cancel = net.total_initiations();
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(net.total_initiations(), initiated_at_cancel);
}

#[tokio::test(start_paused = true)]
async fn repeated_turns_accumulate_ordered_history() {
    let net = Arc::new(MockNet::default());
    let agent = agent_with(net, Arc::new(MockReasoner::failing()));
    let text = "Plan a 3-day romantic trip for me and my girlfriend, budget 20000, avoid crowded places";

    agent.handle("u1", text, HandleOptions::default()).await.unwrap();
    agent.handle("u1", text, HandleOptions::default()).await.unwrap();

    let session = agent.sessions().load("u1");
    assert_eq!(session.history.len(), 2);
    let first = &session.history[0];
    let second = &session.history[1];
    assert!(second.ts_in >= first.ts_out.unwrap());
}

#[tokio::test(start_paused = true)]
async fn garbage_reasoner_still_covers_weather_and_poi() {
    let net = Arc::new(MockNet::default());
    // A reply with no JSON block anywhere: the rule-based chain must kick in.
    let reasoner = Arc::new(MockReasoner::saying("我只能提供一般性建议。"));
    let agent = agent_with(net, reasoner.clone());

    let response = agent
        .handle("u5", "周末去哪里玩好", with_thoughts())
        .await
        .unwrap();

    // Chain, intent summary, and composition each consulted the reasoner.
    assert!(reasoner.calls.load(Ordering::SeqCst) >= 3);

    let thoughts = response.thoughts.expect("thoughts returned");
    assert!(thoughts.iter().any(|t| t.requires(ServiceKind::Poi)));
    assert!(thoughts.iter().any(|t| t.requires(ServiceKind::Weather)));

    let session = agent.sessions().load("u5");
    let plan = &session.last().unwrap().plan;
    assert!(plan.count(ServiceKind::Weather) >= 1);
    assert!(plan.count(ServiceKind::Poi) >= 1);
}

#[tokio::test(start_paused = true)]
async fn dead_provider_is_named_while_others_are_cited() {
    let net = Arc::new(MockNet {
        weather_fail: true,
        ..Default::default()
    });
    let agent = agent_with(net, Arc::new(MockReasoner::failing()));

    let response = agent
        .handle("u6", "去外滩玩一天", HandleOptions::default())
        .await
        .unwrap();

    // The missing dimension is stated...
    assert!(response.answer.contains("天气"));
    assert!(response.answer.contains("未能获取"));
    // ...while POI data is still cited.
    assert!(response.answer.contains("外滩观景台"));
}

#[tokio::test(start_paused = true)]
async fn shared_provider_pacing_across_users() {
    let net = Arc::new(MockNet::default());
    let agent = Arc::new(agent_with(net.clone(), Arc::new(MockReasoner::failing())));

    let text = "去外滩、豫园和陆家嘴玩";
    let (a, b) = tokio::join!(
        agent.handle("ua", text, HandleOptions::default()),
        agent.handle("ub", text, HandleOptions::default())
    );
    a.unwrap();
    b.unwrap();

    // Two turns, three POI specs each, shared bucket with QPS 3.
    let mut initiated = net.initiations(ServiceKind::Poi);
    initiated.sort();
    assert_eq!(initiated.len(), 6);
    for w in initiated.windows(4) {
        assert!(w[3] - w[0] >= Duration::from_secs(1));
    }
}

#[tokio::test(start_paused = true)]
async fn replaying_the_recorded_turn_reproduces_the_plan() {
    let net = Arc::new(MockNet::default());
    let agent = agent_with(net, Arc::new(MockReasoner::failing()));

    agent
        .handle("u7", "从外滩到豫园，顺便吃美食", HandleOptions::default())
        .await
        .unwrap();

    let session = agent.sessions().load("u7");
    let record = session.last().unwrap();
    let replayed =
        tw_reasoning::resolve_plan(&record.thoughts, &record.extracted, "上海");
    assert_eq!(replayed, record.plan);
}
