//! `route` command.

use talkmap_client::{ApiClient, TravelMode};
use talkmap_core::{format_distance, GeoPoint};

/// Plans a route and prints the summary followed by one line per step.
///
/// # Errors
///
/// Returns an error if the planner is unreachable or rejects the request.
pub(crate) async fn run_route(
    api: &ApiClient,
    origin: GeoPoint,
    destination: GeoPoint,
    mode: TravelMode,
) -> anyhow::Result<()> {
    let plan = api.router().plan(origin, destination, mode).await?;

    println!("{origin} -> {destination} ({})", plan.mode);
    println!(
        "全程 {} · 约 {:.0} 分钟",
        format_distance(plan.distance),
        plan.duration
    );
    if plan.steps.is_empty() {
        return Ok(());
    }

    println!();
    let header = format!("{:<4}{:<10}{:<8}INSTRUCTION", "#", "DISTANCE", "MIN");
    println!("{header}");
    for (i, step) in plan.steps.iter().enumerate() {
        println!(
            "{:<4}{:<10}{:<8.0}{}",
            i + 1,
            format_distance(step.distance),
            step.duration,
            step.instruction
        );
    }
    Ok(())
}
