//! Grammar engine: recursive-descent parsing into the dual node store,
//! with combinatorial longest-match disambiguation and token-level error
//! recovery. The parser is the node store's only writer; a finished
//! [`ParseResult`] hands the store to read-only consumers.

pub mod debug;
mod grammar;
mod parser;
mod settings;
#[cfg(test)]
mod tests;

pub use parser::{ParseFailure, ParseOutcome, ParseResult};
use quill_tokenizer::TokenSnapshot;
pub use settings::{EntryPoint, ParseSettings};

pub fn parse(snapshot: &TokenSnapshot, settings: &ParseSettings) -> ParseResult {
    let mut parser = parser::Parser::new(snapshot, settings.cancellation.clone());
    let step = grammar::entry(&mut parser, settings.entry_point.unwrap_or(EntryPoint::Document));
    parser.finish(step)
}

pub fn parse_text(text: &str, settings: &ParseSettings) -> (TokenSnapshot, ParseResult) {
    let snapshot = TokenSnapshot::new(text);
    let result = parse(&snapshot, settings);
    (snapshot, result)
}
