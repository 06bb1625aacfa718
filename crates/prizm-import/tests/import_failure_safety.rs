use prizm_import::{AdapterFactory, ImportInput, ImportResult, ImportSource};

const MALFORMED: &[&str] = &[
    "",
    "   \n\t",
    "{ invalid json }",
    "[1, 2, 3]",
    "null",
    "{\"lists\": \"nope\", \"cards\": 7}",
    "{\"issues\": [{\"key\": 1, \"fields\": []}]}",
    "{\"data\": {\"gid\": 1}}",
    "{\"prizm_export_version\": \"9.1\", \"board\": {\"name\": \"X\"}}",
    "{\"prizm_export_version\": \"1.0\", \"board\": {\"name\": \"  \"}}",
    "\"just a string\"",
    "a,b\n\"unterminated,2\n",
    ",,,\n,,,\n",
];

/// Inputs a forced adapter reads as a header-only table whose header happens
/// to name a title column. These succeed with no tasks rather than fail.
const HEADER_ONLY_CSV: &[(&str, ImportSource)] = &[
    (
        "{\"prizm_export_version\": \"9.1\", \"board\": {\"name\": \"X\"}}",
        ImportSource::Csv,
    ),
    (
        "{\"prizm_export_version\": \"1.0\", \"board\": {\"name\": \"  \"}}",
        ImportSource::Csv,
    ),
];

fn import_as(text: &str, source: ImportSource) -> ImportResult {
    AdapterFactory::default().import(&ImportInput::new(text), Some(source))
}

#[test]
fn test_malformed_input_fails_for_every_adapter() {
    let factory = AdapterFactory::default();
    for text in MALFORMED {
        for source in ImportSource::ALL {
            if HEADER_ONLY_CSV.contains(&(*text, source)) {
                continue;
            }
            let result = factory.import(&ImportInput::new(text), Some(source));
            assert!(!result.success, "{:?} accepted {:?}", source, text);
            assert!(
                !result.errors.is_empty(),
                "{:?} failed without errors on {:?}",
                source,
                text
            );
            assert!(result.tasks.is_empty());
        }
        let detected = factory.import(&ImportInput::new(text), None);
        assert_eq!(detected.success, detected.errors.is_empty());
    }
}

#[test]
fn test_header_only_tables_succeed_without_tasks() {
    for (text, source) in HEADER_ONLY_CSV {
        assert!(MALFORMED.contains(text));
        let result = import_as(text, *source);
        assert!(result.success, "{:?}", result.errors);
        assert!(result.tasks.is_empty());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.message == "No tasks found in the import file"));
    }
}

#[test]
fn test_empty_input_fails_for_every_adapter() {
    for source in ImportSource::ALL {
        let result = import_as("", source);
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert!(result.tasks.is_empty());
    }
}

#[test]
fn test_invalid_json_reports_error() {
    for source in [ImportSource::Trello, ImportSource::Native] {
        let result = import_as("{ invalid json }", source);
        assert!(!result.success);
        assert!(result.errors[0].message.contains("JSON"), "{}", result.errors[0]);
    }
}

#[test]
fn test_trello_without_lists_is_missing_field() {
    let result = import_as("{\"name\": \"Board\", \"cards\": []}", ImportSource::Trello);
    assert!(!result.success);
    assert_eq!(result.errors[0].field.as_deref(), Some("lists"));
}

#[test]
fn test_jira_csv_without_summary_is_missing_field() {
    let result = import_as("Issue key,Status\nPROJ-1,Open\n", ImportSource::Jira);
    assert!(!result.success);
    assert_eq!(result.errors[0].field.as_deref(), Some("Summary"));
}

#[test]
fn test_asana_csv_without_name_is_missing_field() {
    let result = import_as("Task ID,Section/Column\n1,Todo\n", ImportSource::Asana);
    assert!(!result.success);
    assert_eq!(result.errors[0].field.as_deref(), Some("Name"));
}

#[test]
fn test_native_future_version_is_unsupported() {
    let result = import_as(
        "{\"prizm_export_version\": \"2.0\", \"board\": {\"name\": \"X\"}}",
        ImportSource::Native,
    );
    assert!(!result.success);
    assert!(result.errors[0].message.contains("Unsupported"));
}

#[test]
fn test_header_only_csv_succeeds_with_warning() {
    let result = import_as("Title,Status\n", ImportSource::Csv);
    assert!(result.success);
    assert!(result.tasks.is_empty());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.message == "No tasks found in the import file"));
}

#[test]
fn test_invalid_utf8_is_decoded_lossily() {
    let bytes = b"Title,Status\nCaf\xE9 menu,Done\n";
    let input = ImportInput::from_bytes(bytes).with_filename("menu.csv");
    let result = AdapterFactory::default().import(&input, None);
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.stats.tasks, 1);
    assert!(result.warnings.iter().any(|w| w.message.contains("UTF-8")));
}

#[test]
fn test_unknown_format_is_reported() {
    let result = AdapterFactory::default().import(
        &ImportInput::new("{\"hello\": \"world\"}").with_filename("data.json"),
        None,
    );
    assert!(!result.success);
    assert_eq!(result.source, ImportSource::Native);
    assert!(result.errors[0].message.contains("Could not detect"));
}
