//! Registry of adapters and the single entry point for imports.

use prizm_core::ImportSettings;
use prizm_domain::{ImportIssue, ImportResult, ImportSource};

use crate::adapter::{boxed, FormatAdapter};
use crate::adapters::{AsanaAdapter, CsvAdapter, JiraAdapter, NativeAdapter, TrelloAdapter};
use crate::detector::{DetectionResult, FormatDetector};
use crate::input::ImportInput;
use crate::user_matcher::{UserDirectory, UserMatcher};

/// Owns one adapter per format.
///
/// Registration order matters: the detector breaks ties in favour of the
/// adapter registered first, so the generic CSV adapter goes last.
pub struct AdapterFactory {
    settings: ImportSettings,
    adapters: Vec<Box<dyn FormatAdapter>>,
}

impl Default for AdapterFactory {
    fn default() -> Self {
        Self::new(ImportSettings::default())
    }
}

impl AdapterFactory {
    pub fn new(settings: ImportSettings) -> Self {
        let adapters = vec![
            boxed(NativeAdapter::new(settings.clone())),
            boxed(TrelloAdapter::new(settings.clone())),
            boxed(JiraAdapter::new(settings.clone())),
            boxed(AsanaAdapter::new(settings.clone())),
            boxed(CsvAdapter::new(settings.clone())),
        ];
        Self { settings, adapters }
    }

    /// Adds an adapter, replacing any already registered for the same source.
    pub fn register(&mut self, adapter: Box<dyn FormatAdapter>) {
        let source = adapter.source();
        match self.adapters.iter().position(|a| a.source() == source) {
            Some(index) => self.adapters[index] = adapter,
            None => self.adapters.push(adapter),
        }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn supported_formats(&self) -> Vec<ImportSource> {
        self.adapters.iter().map(|a| a.source()).collect()
    }

    pub fn adapter(&self, source: ImportSource) -> Option<&dyn FormatAdapter> {
        self.adapters
            .iter()
            .find(|a| a.source() == source)
            .map(|a| a.as_ref())
    }

    pub fn detector(&self) -> FormatDetector<'_> {
        FormatDetector::new(&self.adapters, self.settings.min_confidence)
    }

    pub fn detect_format(&self, input: &ImportInput<'_>) -> Option<DetectionResult> {
        self.detector().detect(input)
    }

    /// Source a failed import is reported under when nothing recognized it.
    fn fallback_source(input: &ImportInput<'_>) -> ImportSource {
        match input.extension().as_deref() {
            Some("csv" | "tsv") => ImportSource::Csv,
            _ => ImportSource::Native,
        }
    }

    /// Imports with the adapter for `forced`, or the detected one.
    ///
    /// Never panics on bad input: every failure ends up in the result's errors.
    pub fn import(&self, input: &ImportInput<'_>, forced: Option<ImportSource>) -> ImportResult {
        if input.is_blank() {
            let source = forced.unwrap_or_else(|| Self::fallback_source(input));
            return ImportResult::failed(source, ImportIssue::new("The import file is empty"));
        }

        let source = match forced {
            Some(source) => source,
            None => match self.detect_format(input) {
                Some(detected) => detected.source,
                None => {
                    tracing::warn!(filename = ?input.filename(), "Unrecognized import format");
                    return ImportResult::failed(
                        Self::fallback_source(input),
                        ImportIssue::new(
                            "Could not detect the file format. Supported formats: PrizmAI, Trello, Jira, Asana, CSV",
                        ),
                    );
                }
            },
        };

        match self.adapter(source) {
            Some(adapter) => adapter.import(input),
            None => ImportResult::failed(
                source,
                ImportIssue::new(format!("No adapter registered for {}", source.display_name())),
            ),
        }
    }

    /// [`AdapterFactory::import`] followed by user matching on success.
    pub fn import_with_users<D: UserDirectory + ?Sized>(
        &self,
        input: &ImportInput<'_>,
        forced: Option<ImportSource>,
        matcher: &mut UserMatcher<'_, D>,
    ) -> ImportResult {
        let mut result = self.import(input, forced);
        if result.success {
            matcher.resolve(&mut result);
        }
        result
    }
}
