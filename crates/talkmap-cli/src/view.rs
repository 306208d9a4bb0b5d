//! Renders search session snapshots as terminal text.
//!
//! The list and the map are both derived from the same snapshot; neither
//! reads the other.

use std::fmt::Write as _;
use std::io::Write as _;

use talkmap_core::{AppConfig, GeoPoint, ProximityKind, QueryIntent, SortKey};
use talkmap_session::{
    amap_navigation_url, present, MapPresenter, MapSettings, NavigationOpener, NavigationTarget,
    Phase, ResultRow, SearchSession, SessionToken,
};

use crate::terminal_map::TerminalMap;

const MAP_WIDTH_PX: u32 = 800;
const MAP_HEIGHT_PX: u32 = 600;

/// Which detail a result row leads with, following the requested ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Emphasis {
    #[default]
    Distance,
    Rating,
    Transit,
}

impl Emphasis {
    fn of(intent: Option<&QueryIntent>) -> Self {
        let Some(intent) = intent else {
            return Self::Distance;
        };
        let near_transit = intent
            .filters
            .proximity
            .as_ref()
            .is_some_and(|p| p.kind() == ProximityKind::Transit);
        let key = intent.sort_by.key();
        if near_transit || key == SortKey::TransitProximity {
            Self::Transit
        } else if key == SortKey::Rating {
            Self::Rating
        } else {
            Self::Distance
        }
    }
}

pub(crate) struct View {
    map: MapPresenter<TerminalMap>,
    rows: Vec<ResultRow>,
    emphasis: Emphasis,
    drawn: Option<(SessionToken, Phase)>,
}

impl View {
    pub(crate) fn new(config: &AppConfig, home: GeoPoint) -> Self {
        Self {
            map: MapPresenter::new(
                TerminalMap::new(home, MAP_WIDTH_PX, MAP_HEIGHT_PX),
                MapSettings::from_config(config),
            ),
            rows: Vec::new(),
            emphasis: Emphasis::default(),
            drawn: None,
        }
    }

    /// Text for `session`, or `None` if nothing visible changed since the
    /// last call.
    pub(crate) fn render(&mut self, session: &SearchSession) -> Option<String> {
        self.map.sync(session);

        let key = (session.token, session.phase);
        if session.phase == Phase::Idle || self.drawn == Some(key) {
            return None;
        }
        self.drawn = Some(key);
        self.rows = if session.phase == Phase::Succeeded {
            present(&session.results, session.reference)
        } else {
            Vec::new()
        };
        self.emphasis = Emphasis::of(session.intent.as_ref());

        let mut out = String::new();
        match session.phase {
            Phase::Idle => {}
            Phase::Parsing => {
                let query = session.query.as_deref().unwrap_or_default();
                let _ = writeln!(out, "正在解析: {query}");
            }
            Phase::Searching => {
                write_echo(&mut out, session);
                let _ = writeln!(out, "正在搜索...");
            }
            Phase::Succeeded => {
                write_echo(&mut out, session);
                self.write_rows(&mut out);
                out.push_str(&self.map.service().render());
            }
            Phase::Failed => {
                if let Some(error) = &session.error {
                    let _ = writeln!(out, "错误 {error}");
                }
            }
        }
        Some(out)
    }

    /// Opens the popup for result `rank` and returns its text.
    pub(crate) fn open(&mut self, rank: usize) -> Option<String> {
        self.map.open_rank(rank)?;
        let popup = self.map.service().popup()?;
        let mut out = format!("{}\n  {}\n", popup.title, popup.address);
        if let Some(distance) = &popup.distance {
            let _ = writeln!(out, "  距离您：{distance}");
        }
        if let Some(phone) = &popup.phone {
            let _ = writeln!(out, "  电话：{phone}");
        }
        Some(out)
    }

    /// Navigation target for result `rank` in the current list.
    pub(crate) fn navigation(&self, rank: usize) -> Option<&NavigationTarget> {
        self.rows
            .get(rank.checked_sub(1)?)
            .map(|row| &row.navigation)
    }

    fn write_rows(&self, out: &mut String) {
        if self.rows.is_empty() {
            let _ = writeln!(out, "没有找到结果");
            return;
        }
        let _ = writeln!(out, "搜索结果 ({})", self.rows.len());
        for row in &self.rows {
            let _ = writeln!(out, "{:>2}. {} · {}", row.rank, row.name, row.category);
            let distance = Some(format!("距离您：{}", row.distance));
            let transit = row.transit.as_ref().map(|t| format!("距离地铁站：{t}"));
            let rating = row.rating.map(|r| format!("评分：{r:.1}"));
            let details = match self.emphasis {
                Emphasis::Distance => [distance, transit, rating],
                Emphasis::Rating => [rating, distance, transit],
                Emphasis::Transit => [transit, distance, rating],
            };
            for detail in details.into_iter().flatten() {
                let _ = writeln!(out, "    {detail}");
            }
            if let Some(phone) = &row.phone {
                let _ = writeln!(out, "    电话：{phone}");
            }
            if !row.address.is_empty() {
                let _ = writeln!(out, "    {}", row.address);
            }
        }
    }
}

fn write_echo(out: &mut String, session: &SearchSession) {
    if let Some(intent) = &session.intent {
        let _ = writeln!(out, "查询解析 {}", intent.display);
    }
}

/// Prints the amap.com navigation link instead of launching anything.
pub(crate) struct PrintOpener;

impl NavigationOpener for PrintOpener {
    fn open(&self, target: &NavigationTarget) -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "导航 {}: {}", target.label, amap_navigation_url(target))
    }
}
