//! Tag and text events from a streamed HTML body
//!
//! Tokenizing is done by html5ever's HTML5 tokenizer, fed one chunk at a
//! time. This module decodes UTF-8 across chunk boundaries, merges character
//! runs into one text event per gap between tags, and drops the bodies of
//! `script` and `style`.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer as Html5Tokenizer,
    TokenizerOpts,
};
use std::fmt;
use tracing::trace;

/// A tokenizer event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// `<name ...>`; tag names are lowercased
    StartTag(String),
    /// `</name>`, also emitted right after a self-closing `<name/>`
    EndTag(String),
    /// Text between tags with character references decoded
    Text(String),
}

/// Tokenizer state to switch to after a start tag, and whether the content is
/// dropped
fn raw_text_kind(name: &str) -> Option<(RawKind, bool)> {
    match name {
        "script" => Some((RawKind::ScriptData, true)),
        "style" => Some((RawKind::Rawtext, true)),
        "title" | "textarea" => Some((RawKind::Rcdata, false)),
        _ => None,
    }
}

/// Collects html5ever tokens as [`MarkupEvent`]s
#[derive(Debug, Default)]
struct EventSink {
    events: Vec<MarkupEvent>,
    /// Text seen since the last tag
    text: String,
    skipping_raw_text: bool,
}

impl EventSink {
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.events
                .push(MarkupEvent::Text(std::mem::take(&mut self.text)));
        }
    }
}

impl TokenSink for EventSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => {
                if !self.skipping_raw_text {
                    self.text.push_str(&text);
                }
            }
            Token::TagToken(tag) => {
                self.flush_text();
                let name = tag.name.to_string();
                match tag.kind {
                    TagKind::StartTag => {
                        self.events.push(MarkupEvent::StartTag(name.clone()));
                        if tag.self_closing {
                            self.events.push(MarkupEvent::EndTag(name));
                        } else if let Some((kind, skip)) = raw_text_kind(&name) {
                            self.skipping_raw_text = skip;
                            return TokenSinkResult::RawData(kind);
                        }
                    }
                    TagKind::EndTag => {
                        self.skipping_raw_text = false;
                        self.events.push(MarkupEvent::EndTag(name));
                    }
                }
            }
            Token::EOFToken => self.flush_text(),
            Token::ParseError(error) => trace!(%error, "tolerated markup error"),
            _ => {}
        }

        TokenSinkResult::Continue
    }
}

/// Push-based tokenizer. Feed chunks, collect events, then call
/// [`Tokenizer::finish`] once the input is exhausted.
pub struct Tokenizer {
    /// Trailing bytes of an incomplete UTF-8 sequence
    pending_bytes: Vec<u8>,
    input: BufferQueue,
    inner: Html5Tokenizer<EventSink>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            pending_bytes: Vec::new(),
            input: BufferQueue::default(),
            inner: Html5Tokenizer::new(EventSink::default(), TokenizerOpts::default()),
        }
    }

    /// Feed a chunk of bytes and return the events it completes
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<MarkupEvent> {
        let text = self.decode(chunk);
        self.feed_str(&text)
    }

    /// Feed a chunk of text and return the events it completes
    pub fn feed_str(&mut self, chunk: &str) -> Vec<MarkupEvent> {
        if !chunk.is_empty() {
            self.input.push_back(StrTendril::from_slice(chunk));
            let _ = self.inner.feed(&mut self.input);
        }
        self.take_events()
    }

    /// Signal the end of input and flush pending text. A tag cut off by the
    /// end of input is dropped.
    pub fn finish(&mut self) -> Vec<MarkupEvent> {
        if !self.pending_bytes.is_empty() {
            self.pending_bytes.clear();
            self.input.push_back(StrTendril::from_slice("\u{fffd}"));
            let _ = self.inner.feed(&mut self.input);
        }
        self.inner.end();
        self.take_events()
    }

    fn take_events(&mut self) -> Vec<MarkupEvent> {
        std::mem::take(&mut self.inner.sink.events)
    }

    fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending_bytes.extend_from_slice(chunk);

        let mut decoded = String::with_capacity(self.pending_bytes.len());
        let mut start = 0;
        while start < self.pending_bytes.len() {
            match std::str::from_utf8(&self.pending_bytes[start..]) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    start = self.pending_bytes.len();
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    decoded
                        .push_str(&String::from_utf8_lossy(&self.pending_bytes[start..valid_end]));
                    match e.error_len() {
                        Some(invalid_len) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + invalid_len;
                        }
                        // truncated sequence, wait for the next chunk
                        None => {
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending_bytes.drain(..start);
        decoded
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("pending_bytes", &self.pending_bytes)
            .field("sink", &self.inner.sink)
            .finish_non_exhaustive()
    }
}
