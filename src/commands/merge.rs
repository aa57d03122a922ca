use serde_json::Value;

use crate::config::Settings;
use crate::error::Result;
use crate::fixture;
use crate::output;

pub fn run(settings: &Settings) -> Result<()> {
    let merged = fixture::load_merged(&settings.base, &settings.overlay)?;
    print!("{}", output::format_value(&Value::Object(merged), &settings.output)?);
    Ok(())
}
