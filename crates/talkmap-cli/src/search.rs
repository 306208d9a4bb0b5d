//! One-shot `search` command.

use talkmap_client::ApiClient;
use talkmap_core::{AppConfig, GeoPoint};
use talkmap_session::Orchestrator;

use crate::view::View;

/// Runs a single search around `reference` and prints the outcome.
///
/// # Errors
///
/// Returns an error if the query is blank or the session ends in `Failed`,
/// so the process exits non-zero.
pub(crate) async fn run_search(
    config: &AppConfig,
    api: &ApiClient,
    text: &str,
    reference: GeoPoint,
) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(api.parser(), api.searcher(), reference);
    if orchestrator.submit(text).await.is_none() {
        anyhow::bail!("请输入查询内容");
    }

    let session = orchestrator.snapshot();
    let mut view = View::new(config, reference);
    if let Some(error) = session.error {
        return Err(error.into());
    }
    if let Some(text) = view.render(&session) {
        print!("{text}");
    }
    Ok(())
}
