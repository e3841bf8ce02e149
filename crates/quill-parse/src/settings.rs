use quill_errors::{CancellationToken, DEFAULT_LOCALE};

/// Overrides the root production; documents disambiguate between the two
/// forms by default.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryPoint {
    Document,
    Expression,
    Section,
}

#[derive(Clone, Debug)]
pub struct ParseSettings {
    pub cancellation: Option<CancellationToken>,
    pub locale: String,
    pub entry_point: Option<EntryPoint>,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self { cancellation: None, locale: DEFAULT_LOCALE.to_owned(), entry_point: None }
    }
}
