//! Salsa facade: file inputs with tracked tokenize/parse queries.
//!
//! Recovered parse errors are re-emitted through the [`Diagnostic`]
//! accumulator, so hosts read them with `accumulated` on any query that
//! pulls the parse.

use camino::Utf8PathBuf;
pub use quill_errors::Diagnostic;
use quill_errors::Cancelled;
use quill_inspect::{Inspection, InspectionSettings, inspect};
use quill_parse::{ParseResult, ParseSettings};
use quill_tokenizer::TokenSnapshot;
use salsa::{Accumulator as _, Database};
use text_size::TextSize;

#[salsa::input(debug)]
pub struct File {
    #[returns(ref)]
    pub path: Utf8PathBuf,
    #[returns(deref)]
    pub text: String,
}

#[salsa::tracked]
impl File {
    #[salsa::tracked(returns(ref), no_eq)]
    pub fn snapshot(self, db: &dyn Database) -> TokenSnapshot {
        TokenSnapshot::new(self.text(db))
    }

    #[salsa::tracked(returns(ref), no_eq)]
    pub fn parse(self, db: &dyn Database) -> ParseResult {
        let result = quill_parse::parse(self.snapshot(db), &ParseSettings::default());

        for diagnostic in &result.diagnostics {
            Diagnostic::error(diagnostic.message().to_owned(), diagnostic.range()).accumulate(db);
        }

        result
    }
}

#[salsa::tracked]
pub fn check_file(db: &dyn Database, file: File) {
    _ = file.parse(db);
}

/// Convenience wrapper over the inspection engine for a tracked file.
pub fn inspect_file<'db>(
    db: &'db dyn Database,
    file: File,
    offset: TextSize,
    settings: &InspectionSettings,
) -> Result<Inspection<'db>, Cancelled> {
    inspect(db, file.parse(db), file.snapshot(db), offset, settings)
}
