//! HTML log rendering for test reports.
//!
//! Device interactions are rendered as small HTML fragments so the
//! harness report shows command/output pairs instead of a wall of raw
//! text. Fragments are built from templates embedded at compile time;
//! one shared CSS style block is computed once at construction and
//! prefixed to every fragment.

use log::{error, info};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::error::Result;

const STYLE_CSS: &str = include_str!("templates/style.css");
const CLI_TEMPLATE: &str = include_str!("templates/cli.html");
const CLI_PARSE_TEMPLATE: &str = include_str!("templates/cli_parse.html");

/// Where rendered log lines go.
///
/// The surrounding test harness supplies the real sink; fragments
/// passed to [`html`](LogSink::html) must be rendered unescaped.
pub trait LogSink: Send + Sync {
    /// Plain informational line.
    fn info(&self, message: &str);

    /// Plain error line.
    fn error(&self, message: &str);

    /// Pre-rendered HTML fragment.
    fn html(&self, fragment: &str);
}

/// Default sink routing everything through the `log` facade.
///
/// HTML fragments are emitted under the `netharness::html` target so a
/// harness adapter can pick them out of the stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeSink;

impl LogSink for FacadeSink {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }

    fn html(&self, fragment: &str) {
        info!(target: "netharness::html", "{fragment}");
    }
}

/// Renders CLI interactions as HTML fragments.
pub struct HtmlLogger {
    env: Environment<'static>,
    style: String,
}

impl Default for HtmlLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlLogger {
    /// Build the logger from the embedded templates.
    ///
    /// # Panics
    ///
    /// Panics if the embedded templates fail to compile, which would be
    /// a build defect rather than a runtime condition.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("cli.html", CLI_TEMPLATE)
            .expect("embedded cli template");
        env.add_template("cli_parse.html", CLI_PARSE_TEMPLATE)
            .expect("embedded cli_parse template");
        Self {
            env,
            style: format!("<style type='text/css'>{STYLE_CSS}</style>"),
        }
    }

    /// Render a command/output pair.
    pub fn cli(&self, host: &str, command: &str, output: &str) -> Result<String> {
        let fragment = self
            .env
            .get_template("cli.html")?
            .render(context! { host, command, output })?;
        Ok(format!("{}{fragment}", self.style))
    }

    /// Render a command/output pair together with the parse template
    /// and a pretty-printed dump of the parsed variables.
    pub fn cli_parse(
        &self,
        host: &str,
        command: &str,
        output: &str,
        template: &str,
        vars: &serde_json::Value,
    ) -> Result<String> {
        let vars = pretty_json(vars);
        let fragment = self
            .env
            .get_template("cli_parse.html")?
            .render(context! { host, command, output, template, vars })?;
        Ok(format!("{}{fragment}", self.style))
    }
}

/// Pretty-print with 4-space indentation, matching the report style
/// readers of these logs are used to.
fn pretty_json(value: &serde_json::Value) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => value.to_string(),
    }
}
