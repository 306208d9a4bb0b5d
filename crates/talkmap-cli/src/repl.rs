//! Interactive `repl` command.
//!
//! Free text starts a new search; a search still in flight is superseded and
//! its late response never reaches the screen. Rendering is driven only by
//! the orchestrator's snapshot channel.

use std::sync::Arc;

use talkmap_client::ApiClient;
use talkmap_core::{AppConfig, GeoPoint, SAMPLE_QUERIES};
use talkmap_session::{NavigationOpener, Orchestrator};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::view::{PrintOpener, View};

const HELP: &str = "输入查询开始搜索。命令: :open N  :nav N  :samples  :sample N  :help  :quit";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReplCommand {
    Submit(String),
    Open(usize),
    Navigate(usize),
    Samples,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Interprets one input line. Anything not starting with `:` is a query.
pub(crate) fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return ReplCommand::Submit(line.to_owned());
    };

    let mut parts = rest.split_whitespace();
    let command = (parts.next(), parts.next(), parts.next());
    let rank = |n: &str| n.parse::<usize>().ok().filter(|n| *n > 0);
    let parsed = match command {
        (Some("quit" | "q"), None, None) => Some(ReplCommand::Quit),
        (Some("help" | "h"), None, None) => Some(ReplCommand::Help),
        (Some("samples"), None, None) => Some(ReplCommand::Samples),
        (Some("open"), Some(n), None) => rank(n).map(ReplCommand::Open),
        (Some("nav"), Some(n), None) => rank(n).map(ReplCommand::Navigate),
        (Some("sample"), Some(n), None) => rank(n)
            .and_then(|n| SAMPLE_QUERIES.get(n - 1))
            .map(|q| ReplCommand::Submit((*q).to_owned())),
        _ => None,
    };
    parsed.unwrap_or_else(|| ReplCommand::Unknown(line.to_owned()))
}

/// Runs the interactive loop until `:quit` or end of input.
///
/// # Errors
///
/// Returns an error if stdin or stdout fails.
pub(crate) async fn run_repl(
    config: &AppConfig,
    api: &ApiClient,
    reference: GeoPoint,
) -> anyhow::Result<()> {
    let orchestrator = Arc::new(Orchestrator::new(api.parser(), api.searcher(), reference));
    let mut updates = orchestrator.subscribe();
    let mut view = View::new(config, reference);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("当前位置 {reference}");
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    ReplCommand::Submit(text) => {
                        let orchestrator = Arc::clone(&orchestrator);
                        tokio::spawn(async move {
                            orchestrator.submit(&text).await;
                        });
                    }
                    ReplCommand::Open(rank) => match view.open(rank) {
                        Some(popup) => print!("{popup}"),
                        None => println!("没有第 {rank} 个结果"),
                    },
                    ReplCommand::Navigate(rank) => match view.navigation(rank) {
                        Some(target) => PrintOpener.open(target)?,
                        None => println!("没有第 {rank} 个结果"),
                    },
                    ReplCommand::Samples => crate::print_samples(),
                    ReplCommand::Help => println!("{HELP}"),
                    ReplCommand::Quit => break,
                    ReplCommand::Empty => {}
                    ReplCommand::Unknown(input) => println!("未知命令: {input}"),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let session = updates.borrow_and_update().clone();
                if let Some(text) = view.render(&session) {
                    print!("{text}");
                }
            }
        }
    }

    tracing::debug!("repl finished");
    Ok(())
}
