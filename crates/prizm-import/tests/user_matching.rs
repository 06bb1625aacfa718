use prizm_import::{AdapterFactory, ImportInput, InMemoryUserDirectory, UserMatcher};
use std::fs;
use tempfile::tempdir;
use uuid::Uuid;

const USERS: &str = include_str!("fixtures/platform_users.json");
const GENERIC_CSV: &str = include_str!("fixtures/generic_tasks.csv");

#[test]
fn test_users_are_matched_by_email_then_name() {
    let directory = InMemoryUserDirectory::from_json(USERS).unwrap();
    let mut matcher = UserMatcher::new(&directory);
    let input = ImportInput::new(GENERIC_CSV).with_filename("generic_tasks.csv");

    let result = AdapterFactory::default().import_with_users(&input, None, &mut matcher);

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.stats.users_matched, 2);
    assert_eq!(result.stats.users_unmatched, 0);

    let ann: Uuid = "3f6c1a52-8d5e-4c1b-9a7e-2b1f0c9d8e71".parse().unwrap();
    let bob: Uuid = "9a0b2c4d-6e8f-4a1b-8c3d-5e7f9a1b3c5d".parse().unwrap();
    let by_title = |title: &str| {
        result
            .tasks
            .iter()
            .find(|t| t.title == title)
            .and_then(|t| t.assignee_user_id)
    };
    assert_eq!(by_title("Migrate database"), Some(ann));
    assert_eq!(by_title("Update README"), Some(bob));
    assert_eq!(by_title("Plan offsite"), None);
}

#[test]
fn test_matching_is_scoped_to_organization() {
    let directory = InMemoryUserDirectory::from_json(USERS).unwrap();
    let mut matcher = UserMatcher::new(&directory).with_organization(Some(Uuid::new_v4()));
    let input = ImportInput::new(GENERIC_CSV).with_filename("generic_tasks.csv");

    let result = AdapterFactory::default().import_with_users(&input, None, &mut matcher);

    assert!(result.success);
    assert_eq!(result.stats.users_matched, 0);
    assert_eq!(result.stats.users_unmatched, 2);
    assert!(result.tasks.iter().all(|t| t.assignee_user_id.is_none()));
    let unmatched_warnings = result
        .warnings
        .iter()
        .filter(|w| w.message.starts_with("No PrizmAI user matches"))
        .count();
    assert_eq!(unmatched_warnings, 2);
}

#[test]
fn test_directory_loads_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.json");
    fs::write(&path, USERS).unwrap();

    let directory = InMemoryUserDirectory::load_from_file(&path).unwrap();
    assert_eq!(directory.len(), 2);

    assert!(InMemoryUserDirectory::load_from_file(&dir.path().join("missing.json")).is_err());
}
