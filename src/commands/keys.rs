use anyhow::Result;

use stager::CacheKeys;

use super::json;
use super::{open_pipeline, GlobalOptions};
use crate::cli::ContextArgs;

pub fn cmd_keys(global: &GlobalOptions, args: &ContextArgs) -> Result<i32> {
    let events = global.event_sink("keys");
    let (context, config) = global.prepare(args, events.as_ref())?;
    let pipeline = open_pipeline(config, &context, args, events);

    let keys = pipeline.keys()?;
    if global.json {
        json::emit(serde_json::json!({
            "event": "keys",
            "command": "keys",
            "dependency_key": keys.dependency_key.to_string(),
            "payload_key": keys.payload_key.to_string(),
            "lock_present": keys.lock_present,
        }))?;
    } else {
        print!("{}", render_keys(&keys));
    }
    Ok(0)
}

pub fn render_keys(keys: &CacheKeys) -> String {
    let mut out = format!(
        "dependency_key  {}\npayload_key     {}\n",
        keys.dependency_key, keys.payload_key
    );
    if !keys.lock_present {
        out.push_str("note: no lock file; a build would fail\n");
    }
    out
}
