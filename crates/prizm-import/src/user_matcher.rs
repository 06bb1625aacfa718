//! Resolves people named in an import to existing platform accounts.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use prizm_core::PrizmResult;
use prizm_domain::{ImportIssue, ImportResult, ImportedUser, OrganizationId, PlatformUser, UserId};

/// Lookup surface over the platform's user accounts.
///
/// Every lookup is scoped to `organization` when one is given.
#[cfg_attr(test, mockall::automock)]
pub trait UserDirectory {
    fn find_by_email(&self, email: &str, organization: Option<OrganizationId>) -> Option<PlatformUser>;

    fn find_by_username(
        &self,
        username: &str,
        organization: Option<OrganizationId>,
    ) -> Option<PlatformUser>;

    /// Matches against `"first last"` and, failing that, the username.
    fn find_by_name(&self, name: &str, organization: Option<OrganizationId>) -> Option<PlatformUser>;
}

/// A directory backed by a list loaded up front, e.g. from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Vec<PlatformUser>,
}

impl InMemoryUserDirectory {
    pub fn new(users: Vec<PlatformUser>) -> Self {
        Self { users }
    }

    /// Parses a JSON array of platform users.
    pub fn from_json(json: &str) -> PrizmResult<Self> {
        let users: Vec<PlatformUser> = serde_json::from_str(json)?;
        Ok(Self::new(users))
    }

    pub fn load_from_file(path: &Path) -> PrizmResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn scoped(&self, organization: Option<OrganizationId>) -> impl Iterator<Item = &PlatformUser> {
        self.users.iter().filter(move |user| match organization {
            Some(org) => user.organization_id == Some(org),
            None => true,
        })
    }

    fn find(
        &self,
        organization: Option<OrganizationId>,
        predicate: impl Fn(&PlatformUser) -> bool,
    ) -> Option<PlatformUser> {
        self.scoped(organization).find(|user| predicate(user)).cloned()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_email(&self, email: &str, organization: Option<OrganizationId>) -> Option<PlatformUser> {
        let email = email.trim();
        self.find(organization, |user| {
            !user.email.is_empty() && user.email.eq_ignore_ascii_case(email)
        })
    }

    fn find_by_username(
        &self,
        username: &str,
        organization: Option<OrganizationId>,
    ) -> Option<PlatformUser> {
        let username = username.trim();
        self.find(organization, |user| user.username.eq_ignore_ascii_case(username))
    }

    fn find_by_name(&self, name: &str, organization: Option<OrganizationId>) -> Option<PlatformUser> {
        let name = name.trim();
        self.find(organization, |user| user.full_name().eq_ignore_ascii_case(name))
            .or_else(|| self.find_by_username(name, organization))
    }
}

/// Matches imported users by email, then username, then display name.
///
/// Outcomes are cached by user key, so a person who appears on many tasks
/// is looked up once.
pub struct UserMatcher<'a, D: UserDirectory + ?Sized> {
    directory: &'a D,
    organization: Option<OrganizationId>,
    cache: HashMap<String, Option<UserId>>,
}

impl<'a, D: UserDirectory + ?Sized> UserMatcher<'a, D> {
    pub fn new(directory: &'a D) -> Self {
        Self {
            directory,
            organization: None,
            cache: HashMap::new(),
        }
    }

    pub fn with_organization(mut self, organization: Option<OrganizationId>) -> Self {
        self.organization = organization;
        self
    }

    pub fn match_user(&mut self, user: &ImportedUser) -> Option<UserId> {
        if let Some(cached) = self.cache.get(&user.key) {
            return *cached;
        }

        let org = self.organization;
        let found = user
            .email
            .as_deref()
            .and_then(|email| self.directory.find_by_email(email, org))
            .or_else(|| {
                user.username
                    .as_deref()
                    .and_then(|username| self.directory.find_by_username(username, org))
            })
            .or_else(|| {
                user.display_name
                    .as_deref()
                    .and_then(|name| self.directory.find_by_name(name, org))
            })
            .map(|platform| platform.id);

        tracing::debug!(user = %user.key, matched = found.is_some(), "Matched imported user");
        self.cache.insert(user.key.clone(), found);
        found
    }

    /// Matches every user in `result` and fills in task assignee ids.
    /// Unmatched users produce one warning each; tasks keep them unassigned.
    pub fn resolve(&mut self, result: &mut ImportResult) {
        let mut matched: HashMap<String, UserId> = HashMap::new();
        let mut unmatched: HashSet<String> = HashSet::new();

        for user in result.users.iter_mut() {
            user.matched_user_id = self.match_user(user);
            match user.matched_user_id {
                Some(id) => {
                    matched.insert(user.key.clone(), id);
                }
                None => {
                    unmatched.insert(user.key.clone());
                }
            }
        }

        for task in result.tasks.iter_mut() {
            task.assignee_user_id = task
                .assignee
                .as_ref()
                .and_then(|key| matched.get(key))
                .copied();
        }

        let mut warnings: Vec<ImportIssue> = result
            .users
            .iter()
            .filter(|user| unmatched.contains(&user.key))
            .map(|user| {
                ImportIssue::new(format!(
                    "No PrizmAI user matches '{}'; their tasks stay unassigned",
                    user.label()
                ))
                .with_field("assignee")
            })
            .collect();
        result.warnings.append(&mut warnings);

        result.stats.users_matched = matched.len();
        result.stats.users_unmatched = unmatched.len();
    }
}
