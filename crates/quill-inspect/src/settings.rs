use quill_errors::{CancellationToken, DEFAULT_LOCALE};

use crate::external::ExternalTypeResolver;

pub struct InspectionSettings {
    pub cancellation: Option<CancellationToken>,
    pub locale: String,
    pub resolver: ExternalTypeResolver,
}

impl Default for InspectionSettings {
    fn default() -> Self {
        Self {
            cancellation: None,
            locale: DEFAULT_LOCALE.to_owned(),
            resolver: Box::new(|_| None),
        }
    }
}
