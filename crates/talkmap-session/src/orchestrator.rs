//! The search session state machine.
//!
//! ```text
//! Idle | Succeeded | Failed --submit--> Parsing
//! Parsing   --parse ok-->   Searching     --parse err-->  Failed
//! Searching --search ok-->  Succeeded     --search err--> Failed
//! ```
//!
//! Every `submit` stamps a fresh [`SessionToken`]. Both async stages check
//! their token against the live session before touching state, so a response
//! from a superseded session is dropped rather than merged. There is no
//! network-level cancellation; a superseded request simply finishes unseen.

use std::sync::Arc;

use tokio::sync::watch;

use talkmap_core::{ErrorInfo, GeoPoint, QueryIntent, SearchResult};

use crate::collaborators::{PlaceSearcher, QueryParser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Parsing,
    Searching,
    Succeeded,
    Failed,
}

impl Phase {
    #[must_use]
    pub fn is_loading(self) -> bool {
        matches!(self, Phase::Parsing | Phase::Searching)
    }

    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// Snapshot of the live session.
///
/// `results` is shared between snapshots of the same session; a new `Arc`
/// means the result set changed.
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub token: SessionToken,
    pub reference: GeoPoint,
    pub query: Option<String>,
    pub phase: Phase,
    pub intent: Option<QueryIntent>,
    pub results: Arc<[SearchResult]>,
    pub error: Option<ErrorInfo>,
}

impl SearchSession {
    fn idle(reference: GeoPoint) -> Self {
        Self {
            token: SessionToken(0),
            reference,
            query: None,
            phase: Phase::Idle,
            intent: None,
            results: Arc::from(Vec::new()),
            error: None,
        }
    }
}

/// Owns the search session and drives it through parse and search.
///
/// Share it behind an `Arc` so that a new `submit` can run while an older one
/// is still awaiting a response.
pub struct Orchestrator<P, S> {
    parser: P,
    searcher: S,
    state: watch::Sender<SearchSession>,
}

impl<P, S> Orchestrator<P, S>
where
    P: QueryParser,
    S: PlaceSearcher,
{
    pub fn new(parser: P, searcher: S, reference: GeoPoint) -> Self {
        let (state, _) = watch::channel(SearchSession::idle(reference));
        Self {
            parser,
            searcher,
            state,
        }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SearchSession {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchSession> {
        self.state.subscribe()
    }

    /// Moves the reference location used by the current snapshot and by
    /// every later session. A session already in flight keeps searching
    /// around the reference it started with.
    pub fn set_reference(&self, reference: GeoPoint) {
        self.state.send_if_modified(|session| {
            if session.reference == reference {
                return false;
            }
            session.reference = reference;
            true
        });
    }

    /// Starts a new session for `text` and runs it to completion.
    ///
    /// Blank text is ignored: no transition, no request, `None` returned.
    /// Otherwise the previous session is discarded, the new one moves through
    /// `Parsing` and `Searching`, and its token is returned once it settles
    /// or is superseded.
    pub async fn submit(&self, text: &str) -> Option<SessionToken> {
        let query = text.trim();
        if query.is_empty() {
            tracing::debug!("ignoring blank query");
            return None;
        }

        let (token, reference) = self.begin(query);

        let intent = match self.parser.parse(query, reference).await {
            Ok(intent) => intent,
            Err(error) => {
                self.fail(token, error);
                return Some(token);
            }
        };

        let next_intent = intent.clone();
        let live = self.apply(token, move |session| {
            session.phase = Phase::Searching;
            session.intent = Some(next_intent);
        });
        if !live {
            // Superseded while parsing; the newer session owns the search.
            return Some(token);
        }

        match self.searcher.search(&intent, reference).await {
            Ok(results) => {
                let count = results.len();
                let applied = self.apply(token, move |session| {
                    session.phase = Phase::Succeeded;
                    session.results = Arc::from(results);
                });
                if applied {
                    tracing::info!(%token, count, "search succeeded");
                }
            }
            Err(error) => self.fail(token, error),
        }
        Some(token)
    }

    /// Replaces the live session with a fresh `Parsing` one.
    fn begin(&self, query: &str) -> (SessionToken, GeoPoint) {
        let mut started = (SessionToken(0), self.state.borrow().reference);
        self.state.send_modify(|session| {
            let token = SessionToken(session.token.0 + 1);
            let superseded = session.phase.is_loading().then_some(session.token);
            *session = SearchSession {
                token,
                reference: session.reference,
                query: Some(query.to_owned()),
                phase: Phase::Parsing,
                intent: None,
                results: Arc::from(Vec::new()),
                error: None,
            };
            started = (token, session.reference);
            tracing::info!(%token, query, superseded = ?superseded, "search session started");
        });
        started
    }

    fn fail(&self, token: SessionToken, error: ErrorInfo) {
        let kind = error.kind;
        let detail = error.message.clone();
        let applied = self.apply(token, move |session| {
            session.phase = Phase::Failed;
            session.error = Some(error);
        });
        if applied {
            tracing::warn!(%token, %kind, detail = %detail, "search session failed");
        }
    }

    /// Runs `update` only if `token` is still the live session.
    ///
    /// Returns `false`, leaving state untouched, for a superseded session.
    fn apply<F>(&self, token: SessionToken, update: F) -> bool
    where
        F: FnOnce(&mut SearchSession),
    {
        let applied = self.state.send_if_modified(|session| {
            if session.token != token {
                return false;
            }
            update(session);
            true
        });
        if !applied {
            tracing::debug!(%token, "discarding response from superseded session");
        }
        applied
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
