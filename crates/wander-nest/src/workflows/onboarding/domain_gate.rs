use regex::RegexSet;

use crate::config::AuthConfig;

#[derive(Debug, thiserror::Error)]
pub enum DomainPolicyError {
    #[error("invalid institutional domain pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Decides whether an email belongs to an academic institution.
///
/// Matching runs against the lowercased domain part only: a domain passes if
/// it ends with one of the configured suffixes or matches any configured
/// pattern.
#[derive(Debug, Clone)]
pub struct InstitutionalEmailPolicy {
    suffixes: Vec<String>,
    patterns: RegexSet,
}

impl InstitutionalEmailPolicy {
    pub fn new<I, P>(suffixes: I, patterns: P) -> Result<Self, DomainPolicyError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let suffixes = suffixes
            .into_iter()
            .map(|suffix| suffix.as_ref().trim().to_ascii_lowercase())
            .filter(|suffix| !suffix.is_empty())
            .collect();
        let patterns = RegexSet::new(patterns)?;
        Ok(Self { suffixes, patterns })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, DomainPolicyError> {
        Self::new(&config.institutional_domains, &config.institutional_patterns)
    }

    pub fn is_institutional(&self, email: &str) -> bool {
        let Some(domain) = email_domain(email) else {
            return false;
        };

        self.suffixes.iter().any(|suffix| domain.ends_with(suffix.as_str()))
            || self.patterns.is_match(&domain)
    }
}

/// Lowercased text after the last `@`, if any.
pub fn email_domain(email: &str) -> Option<String> {
    let (local, domain) = email.trim().rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some(domain.to_ascii_lowercase())
}
