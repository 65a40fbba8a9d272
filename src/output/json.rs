//! JSON output formatting

use std::io;

use serde::Serialize;

use crate::identity::PageIdentity;
use crate::messaging::Command;
use crate::navigation::PromptAnswerItem;
use crate::session::{NavigationSignal, NavigatorSession};

/// Everything the CLI knows about a page, for `--json`.
#[derive(Debug, Serialize)]
pub struct SessionReport<'a> {
    pub page: &'a PageIdentity,
    pub adapter: &'static str,
    pub document_height: f64,
    pub items: &'a [PromptAnswerItem],
    /// Commands applied before the report, in order
    pub commands: &'a [Command],
    pub signal: NavigationSignal,
}

impl<'a> SessionReport<'a> {
    pub fn new(session: &'a NavigatorSession, commands: &'a [Command]) -> Self {
        let index = session.index();
        Self {
            page: session.identity(),
            adapter: index.adapter().name(),
            document_height: index.document_height(),
            items: index.items(),
            commands,
            signal: session.snapshot(),
        }
    }
}

/// Print any serializable value as pretty-printed JSON to stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}
