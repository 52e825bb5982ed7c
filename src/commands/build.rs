use anyhow::Result;

use stager::BuildReport;

use super::json;
use super::{open_pipeline, GlobalOptions};
use crate::cli::ContextArgs;

pub fn cmd_build(global: &GlobalOptions, args: &ContextArgs) -> Result<i32> {
    let events = global.event_sink("build");
    let (context, config) = global.prepare(args, events.as_ref())?;

    let report = open_pipeline(config, &context, args, events).build()?;

    if global.json {
        json::emit(serde_json::json!({
            "event": "complete",
            "command": "build",
            "project": report.project,
            "dependency_key": report.dependency_key.to_string(),
            "payload_key": report.payload_key.to_string(),
            "fingerprint": report.fingerprint.to_string(),
            "status": report.sync_status.as_str(),
            "packages": report.package_count,
        }))?;
    } else {
        print!("{}", render_report(&report));
    }
    Ok(0)
}

pub fn render_report(report: &BuildReport) -> String {
    format!(
        "Built {}\n  dependencies  {} ({}, {} packages)\n  payload       {}\n  fingerprint   {}\n",
        report.project,
        report.dependency_key.short(),
        report.sync_status.as_str().replace('_', " "),
        report.package_count,
        report.payload_key.short(),
        report.fingerprint.short(),
    )
}
