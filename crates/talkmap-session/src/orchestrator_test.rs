use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use talkmap_core::{DisplayEcho, ErrorKind, Filters, SortBy};

use super::*;

type Parsed = Result<QueryIntent, ErrorInfo>;
type Found = Result<Vec<SearchResult>, ErrorInfo>;
type ParseFn = dyn Fn(&str) -> Parsed + Send + Sync;
type SearchFn = dyn Fn(&QueryIntent) -> Found + Send + Sync;

struct FakeParser {
    respond: Box<ParseFn>,
    hold: Option<(String, Arc<Notify>)>,
    calls: AtomicUsize,
}

impl FakeParser {
    fn new(respond: impl Fn(&str) -> Parsed + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            hold: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Blocks `parse(text)` until `gate` is notified.
    fn holding(mut self, text: &str, gate: Arc<Notify>) -> Self {
        self.hold = Some((text.to_owned(), gate));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryParser for FakeParser {
    async fn parse(&self, text: &str, _reference: GeoPoint) -> Result<QueryIntent, ErrorInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((held, gate)) = &self.hold {
            if held == text {
                gate.notified().await;
            }
        }
        (self.respond)(text)
    }
}

struct FakeSearcher {
    respond: Box<SearchFn>,
    hold: Option<(String, Arc<Notify>)>,
    seen: Mutex<Vec<(String, GeoPoint)>>,
}

impl FakeSearcher {
    fn new(respond: impl Fn(&QueryIntent) -> Found + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            hold: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Blocks searches for `category` until `gate` is notified.
    fn holding(mut self, category: &str, gate: Arc<Notify>) -> Self {
        self.hold = Some((category.to_owned(), gate));
        self
    }

    /// `(category, resolved location)` for every search received.
    fn seen(&self) -> Vec<(String, GeoPoint)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaceSearcher for FakeSearcher {
    async fn search(
        &self,
        intent: &QueryIntent,
        reference: GeoPoint,
    ) -> Result<Vec<SearchResult>, ErrorInfo> {
        {
            let mut seen = self.seen.lock().unwrap();
            seen.push((intent.category.clone(), intent.search_location(reference)));
        }
        if let Some((held, gate)) = &self.hold {
            if *held == intent.category {
                gate.notified().await;
            }
        }
        (self.respond)(intent)
    }
}

fn point(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng).unwrap()
}

fn reference() -> GeoPoint {
    point(31.2397, 121.4994)
}

fn intent(category: &str, location: Option<GeoPoint>) -> QueryIntent {
    QueryIntent {
        category: category.to_owned(),
        subcategory: None,
        radius: 1000,
        limit: 10,
        sort_by: SortBy::new("distance"),
        filters: Filters {
            location,
            ..Filters::default()
        },
        display: DisplayEcho::default(),
    }
}

fn result(id: &str, distance: f64) -> SearchResult {
    SearchResult {
        id: id.to_owned(),
        name: format!("店铺{id}"),
        category: "咖啡店".to_owned(),
        address: "陆家嘴环路".to_owned(),
        location: point(31.24, 121.50),
        distance,
        phone: None,
        nearest_transit: None,
        brand: None,
        rating: None,
    }
}

fn ids(session: &SearchSession) -> Vec<&str> {
    session.results.iter().map(|r| r.id.as_str()).collect()
}

/// Parser that turns the query text itself into the category.
fn echo_parser() -> FakeParser {
    FakeParser::new(|text| Ok(intent(text, None)))
}

/// Searcher that returns one result whose id is the searched category.
fn echo_searcher() -> FakeSearcher {
    FakeSearcher::new(|intent| Ok(vec![result(&intent.category, 100.0)]))
}

#[tokio::test]
async fn blank_text_is_ignored() {
    let parser = Arc::new(echo_parser());
    let orchestrator = Orchestrator::new(Arc::clone(&parser), echo_searcher(), reference());
    let rx = orchestrator.subscribe();

    assert_eq!(orchestrator.submit("   \n").await, None);

    let session = orchestrator.snapshot();
    assert_eq!(session.phase, Phase::Idle);
    assert_eq!(session.token.value(), 0);
    assert!(session.query.is_none());
    assert_eq!(parser.calls(), 0);
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn successful_session_keeps_ranked_order() {
    let searcher = FakeSearcher::new(|_| {
        Ok(vec![
            result("c", 300.0),
            result("a", 100.0),
            result("b", 200.0),
        ])
    });
    let orchestrator = Orchestrator::new(echo_parser(), searcher, reference());

    let token = orchestrator.submit("  附近的咖啡店 ").await.unwrap();

    let session = orchestrator.snapshot();
    assert_eq!(token.value(), 1);
    assert_eq!(session.token, token);
    assert_eq!(session.phase, Phase::Succeeded);
    assert_eq!(session.query.as_deref(), Some("附近的咖啡店"));
    assert_eq!(session.intent.as_ref().unwrap().category, "附近的咖啡店");
    assert_eq!(ids(&session), ["c", "a", "b"]);
    assert!(session.error.is_none());
}

#[tokio::test]
async fn parse_failure_never_reaches_search() {
    let parser =
        FakeParser::new(|_| Err(ErrorInfo::new(ErrorKind::ParseFailed, "无法识别位置")));
    let searcher = Arc::new(echo_searcher());
    let orchestrator = Orchestrator::new(parser, Arc::clone(&searcher), reference());

    orchestrator.submit("去火星").await;

    let session = orchestrator.snapshot();
    assert_eq!(session.phase, Phase::Failed);
    assert_eq!(
        session.error,
        Some(ErrorInfo::new(ErrorKind::ParseFailed, "无法识别位置"))
    );
    assert!(session.intent.is_none());
    assert!(session.results.is_empty());
    assert!(searcher.seen().is_empty());
}

#[tokio::test]
async fn search_failure_keeps_parsed_intent() {
    let searcher =
        FakeSearcher::new(|_| Err(ErrorInfo::new(ErrorKind::SearchFailed, "搜索失败")));
    let orchestrator = Orchestrator::new(echo_parser(), searcher, reference());

    orchestrator.submit("咖啡店").await;

    let session = orchestrator.snapshot();
    assert_eq!(session.phase, Phase::Failed);
    assert_eq!(session.error.as_ref().unwrap().kind, ErrorKind::SearchFailed);
    assert_eq!(session.intent.as_ref().unwrap().category, "咖啡店");
    assert!(session.results.is_empty());
}

#[tokio::test]
async fn parsed_location_supersedes_reference() {
    let oriental_pearl = point(31.2404, 121.4998);
    let parser = FakeParser::new(move |text| {
        if text.contains("东方明珠") {
            Ok(intent("咖啡店", Some(oriental_pearl)))
        } else {
            Ok(intent("咖啡店", None))
        }
    });
    let searcher = Arc::new(echo_searcher());
    let orchestrator = Orchestrator::new(parser, Arc::clone(&searcher), reference());

    orchestrator.submit("东方明珠附近的星巴克").await;
    orchestrator.submit("附近的星巴克").await;

    let seen = searcher.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].1, oriental_pearl);
    assert_eq!(seen[1].1, reference());
}

#[tokio::test]
async fn subscriber_observes_each_phase() {
    let parse_gate = Arc::new(Notify::new());
    let search_gate = Arc::new(Notify::new());
    let parser = echo_parser().holding("咖啡店", Arc::clone(&parse_gate));
    let searcher = echo_searcher().holding("咖啡店", Arc::clone(&search_gate));
    let orchestrator = Arc::new(Orchestrator::new(parser, searcher, reference()));
    let mut rx = orchestrator.subscribe();

    let task = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.submit("咖啡店").await }
    });

    let phase = rx.wait_for(|s| s.phase == Phase::Parsing).await.unwrap().phase;
    assert!(phase.is_loading());
    parse_gate.notify_one();

    let searching = rx.wait_for(|s| s.phase == Phase::Searching).await.unwrap().clone();
    assert!(searching.intent.is_some());
    assert!(searching.results.is_empty());
    search_gate.notify_one();

    let done = rx.wait_for(|s| s.phase.is_settled()).await.unwrap().clone();
    assert_eq!(done.phase, Phase::Succeeded);
    assert_eq!(ids(&done), ["咖啡店"]);
    assert_eq!(task.await.unwrap().map(SessionToken::value), Some(1));
}

#[tokio::test]
async fn superseded_parse_response_is_discarded() {
    let gate = Arc::new(Notify::new());
    let parser = echo_parser().holding("慢", Arc::clone(&gate));
    let searcher = Arc::new(echo_searcher());
    let orchestrator = Arc::new(Orchestrator::new(parser, Arc::clone(&searcher), reference()));
    let mut rx = orchestrator.subscribe();

    let slow = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.submit("慢").await }
    });
    rx.wait_for(|s| s.query.as_deref() == Some("慢")).await.unwrap();

    let fast = orchestrator.submit("快").await.unwrap();
    assert_eq!(fast.value(), 2);

    gate.notify_one();
    assert_eq!(slow.await.unwrap().map(SessionToken::value), Some(1));

    let session = orchestrator.snapshot();
    assert_eq!(session.token, fast);
    assert_eq!(session.phase, Phase::Succeeded);
    assert_eq!(session.query.as_deref(), Some("快"));
    assert_eq!(ids(&session), ["快"]);
    // The stale session never issued its search.
    let searched: Vec<String> = searcher.seen().into_iter().map(|(c, _)| c).collect();
    assert_eq!(searched, ["快"]);
}

#[tokio::test]
async fn superseded_search_response_is_discarded() {
    let gate = Arc::new(Notify::new());
    let searcher = echo_searcher().holding("慢", Arc::clone(&gate));
    let orchestrator = Arc::new(Orchestrator::new(echo_parser(), searcher, reference()));
    let mut rx = orchestrator.subscribe();

    let slow = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.submit("慢").await }
    });
    rx.wait_for(|s| s.phase == Phase::Searching).await.unwrap();

    orchestrator.submit("快").await;
    gate.notify_one();
    slow.await.unwrap();

    let session = orchestrator.snapshot();
    assert_eq!(session.token.value(), 2);
    assert_eq!(session.intent.as_ref().unwrap().category, "快");
    assert_eq!(ids(&session), ["快"]);
}

#[tokio::test]
async fn failed_session_recovers_on_next_submit() {
    let parser = FakeParser::new(|text| {
        if text == "坏" {
            Err(ErrorInfo::new(ErrorKind::Network, "connection refused"))
        } else {
            Ok(intent(text, None))
        }
    });
    let orchestrator = Orchestrator::new(parser, echo_searcher(), reference());

    orchestrator.submit("坏").await;
    assert_eq!(orchestrator.snapshot().phase, Phase::Failed);

    orchestrator.submit("好").await;
    let session = orchestrator.snapshot();
    assert_eq!(session.token.value(), 2);
    assert_eq!(session.phase, Phase::Succeeded);
    assert!(session.error.is_none());
    assert_eq!(ids(&session), ["好"]);
}

#[tokio::test]
async fn moved_reference_applies_to_next_session() {
    let searcher = Arc::new(echo_searcher());
    let orchestrator = Orchestrator::new(echo_parser(), Arc::clone(&searcher), reference());
    let rx = orchestrator.subscribe();

    orchestrator.set_reference(reference());
    assert!(!rx.has_changed().unwrap());

    let moved = point(39.9042, 116.4074);
    orchestrator.set_reference(moved);
    assert!(rx.has_changed().unwrap());
    assert_eq!(orchestrator.snapshot().reference, moved);

    orchestrator.submit("咖啡店").await;
    assert_eq!(searcher.seen()[0].1, moved);
    assert_eq!(orchestrator.snapshot().reference, moved);
}
