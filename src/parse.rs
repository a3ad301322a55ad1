//! TextFSM-backed output parsing.
//!
//! Parsing is delegated entirely to the `textfsm-rust` engine; this
//! module only maps its records into JSON values and turns the
//! zero-match case into a diagnosable [`Error::Parse`]. The whole
//! module sits behind the `textfsm` feature so the engine's absence
//! never breaks unrelated keywords.

use serde_json::Value;
use textfsm_rust::Template;

use crate::error::{Error, Result};

/// Parse raw CLI text with a TextFSM template, one JSON object per
/// matched record.
///
/// Zero matched records means the output did not fit the template and
/// is reported as [`Error::Parse`], carrying both the text and the
/// template for display. A template that fails to compile is reported
/// the same way.
pub fn parse_records(text: &str, template: &str) -> Result<Vec<Value>> {
    let parse_failure = || Error::Parse {
        text: text.to_string(),
        template: template.to_string(),
    };

    let compiled = Template::parse_str(template).map_err(|_| parse_failure())?;
    let mut parser = compiled.parser();
    let records = parser
        .parse_text_to_dicts(text)
        .map_err(|_| parse_failure())?;
    if records.is_empty() {
        return Err(parse_failure());
    }

    records
        .into_iter()
        .map(|record| serde_json::to_value(record).map_err(Error::from))
        .collect()
}

/// Parse raw CLI text and collapse the result the way the keyword
/// surface documents: a single matched record is returned directly
/// unless `force_list` keeps the list wrapper.
pub fn parse_text(text: &str, template: &str, force_list: bool) -> Result<Value> {
    let mut records = parse_records(text, template)?;
    if records.len() == 1 && !force_list {
        Ok(records.remove(0))
    } else {
        Ok(Value::Array(records))
    }
}
