//! Search results page parser
//!
//! The index renders each hit as one row of the first table on the page:
//!
//! ```html
//! <tr><td><a href="...">name&nbsp;version</a></td><td>weight</td><td>description</td></tr>
//! ```
//!
//! [`ParserState`] holds everything the parser knows and [`transition`] is a
//! pure function from a state and one [`MarkupEvent`] to the next state.
//! [`SearchPageParser`] drives it from raw body chunks.

use crate::error::{MarkupError, Result};
use crate::markup::{MarkupEvent, Tokenizer};
use crate::types::SearchResult;
use crate::utils::collapse_whitespace;
use tracing::{debug, trace};

/// Separator between package name and version in a result link
pub const NBSP: char = '\u{a0}';

/// Parser state between markup events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserState {
    /// Inside the result table
    pub handling_active: bool,

    /// The next text is the `name<NBSP>version` link label
    pub expecting_name_field: bool,

    /// Data cells seen since the link label of the current row
    pub cell_index: usize,

    /// Row being filled in
    pub current: Option<SearchResult>,

    /// Rows already closed, in page order
    pub completed: Vec<SearchResult>,

    /// The result table has been seen and closed; later tables are ignored
    pub table_consumed: bool,
}

/// Apply one markup event to the parser state
pub fn transition(
    mut state: ParserState,
    event: &MarkupEvent,
) -> std::result::Result<ParserState, MarkupError> {
    step(&mut state, event)?;
    Ok(state)
}

/// Apply one event in place. On error the state is left untouched.
fn step(state: &mut ParserState, event: &MarkupEvent) -> std::result::Result<(), MarkupError> {
    match event {
        MarkupEvent::StartTag(name) => match name.as_str() {
            "table" if !state.handling_active && !state.table_consumed => {
                state.handling_active = true;
            }
            "a" if state.handling_active => {
                state.current = Some(SearchResult::new());
                state.expecting_name_field = true;
            }
            _ => {}
        },
        MarkupEvent::EndTag(name) => match name.as_str() {
            "tr" => match state.current.take() {
                Some(row) => {
                    debug!(name = ?row.name, version = ?row.version, "search result row closed");
                    state.completed.push(row);
                }
                None if state.handling_active => return Err(MarkupError::OrphanRow),
                None => {}
            },
            "table" if state.handling_active => {
                state.handling_active = false;
                state.table_consumed = true;
            }
            _ => {}
        },
        MarkupEvent::Text(text) => apply_text(state, text.trim())?,
    }

    Ok(())
}

fn apply_text(state: &mut ParserState, text: &str) -> std::result::Result<(), MarkupError> {
    if text.is_empty() {
        return Ok(());
    }
    let Some(current) = state.current.as_mut() else {
        return Ok(());
    };

    if state.expecting_name_field {
        let mut parts = text.split(NBSP);
        let (Some(name), Some(version), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(MarkupError::NameField(text.to_string()));
        };
        current.name = Some(name.to_string());
        current.version = Some(version.to_string());
        state.expecting_name_field = false;
        state.cell_index = 0;
    } else {
        if state.cell_index == 0 {
            let weight = text
                .parse::<i64>()
                .map_err(|_| MarkupError::Weight(text.to_string()))?;
            current.weight = Some(weight);
        } else {
            current.desc = Some(collapse_whitespace(text));
        }
        state.cell_index += 1;
    }

    Ok(())
}

/// Streaming parser for search result pages.
///
/// Feed body chunks in order with [`feed`](Self::feed), then call
/// [`close`](Self::close). A markup error stops at the offending event; rows
/// completed before it stay available through [`results`](Self::results).
#[derive(Debug, Default)]
pub struct SearchPageParser {
    tokenizer: Tokenizer,
    state: ParserState,
}

impl SearchPageParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk of the page body
    pub fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        let events = self.tokenizer.feed(chunk);
        self.apply(events)
    }

    /// Feed the next chunk of the page as text
    pub fn feed_str(&mut self, chunk: &str) -> Result<()> {
        let events = self.tokenizer.feed_str(chunk);
        self.apply(events)
    }

    /// Signal the end of the body, flushing any buffered text
    pub fn close(&mut self) -> Result<()> {
        let events = self.tokenizer.finish();
        self.apply(events)
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ParserState {
        &mut self.state
    }

    /// Results completed so far
    pub fn results(&self) -> &[SearchResult] {
        &self.state.completed
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        self.state.completed
    }

    fn apply(&mut self, events: Vec<MarkupEvent>) -> Result<()> {
        for event in events {
            trace!(?event, "markup event");
            step(&mut self.state, &event)?;
        }
        Ok(())
    }
}
