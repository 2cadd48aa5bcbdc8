//! Equality-based label selectors (`k=v`, `k==v`, `k!=v`, `k`, `!k`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("label selector is empty")]
    Empty,
    #[error("invalid label selector requirement '{requirement}': {reason}")]
    InvalidRequirement {
        requirement: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Equals { key: String, value: String },
    NotEquals { key: String, value: String },
    Exists { key: String },
    DoesNotExist { key: String },
}

impl Requirement {
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Self::Equals { key, value } => labels.get(key) == Some(value),
            // Matches Kubernetes semantics: an absent key satisfies `!=`.
            Self::NotEquals { key, value } => labels.get(key) != Some(value),
            Self::Exists { key } => labels.contains_key(key),
            Self::DoesNotExist { key } => !labels.contains_key(key),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { key, value } => write!(f, "{key}={value}"),
            Self::NotEquals { key, value } => write!(f, "{key}!={value}"),
            Self::Exists { key } => f.write_str(key),
            Self::DoesNotExist { key } => write!(f, "!{key}"),
        }
    }
}

/// A conjunction of label requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        if input.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let requirements = input
            .split(',')
            .map(parse_requirement)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { requirements })
    }

    /// Builds a selector of `key=value` requirements.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, SelectorError> {
        let requirements = pairs
            .into_iter()
            .map(|(key, value)| {
                validate_key(key, key)?;
                validate_value(value, key)?;
                Ok(Requirement::Equals {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            })
            .collect::<Result<Vec<_>, SelectorError>>()?;
        if requirements.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { requirements })
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements
            .iter()
            .all(|requirement| requirement.matches(labels))
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, requirement) in self.requirements.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{requirement}")?;
        }
        Ok(())
    }
}

impl FromStr for LabelSelector {
    type Err = SelectorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

fn parse_requirement(raw: &str) -> Result<Requirement, SelectorError> {
    let requirement = raw.trim();
    if requirement.is_empty() {
        return Err(SelectorError::InvalidRequirement {
            requirement: raw.to_string(),
            reason: "empty requirement",
        });
    }

    if let Some((key, value)) = requirement.split_once("!=") {
        let (key, value) = (key.trim(), value.trim());
        validate_key(key, requirement)?;
        validate_value(value, requirement)?;
        return Ok(Requirement::NotEquals {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    if let Some((key, value)) = requirement
        .split_once("==")
        .or_else(|| requirement.split_once('='))
    {
        let (key, value) = (key.trim(), value.trim());
        validate_key(key, requirement)?;
        validate_value(value, requirement)?;
        return Ok(Requirement::Equals {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    if let Some(key) = requirement.strip_prefix('!') {
        let key = key.trim();
        validate_key(key, requirement)?;
        return Ok(Requirement::DoesNotExist {
            key: key.to_string(),
        });
    }

    validate_key(requirement, requirement)?;
    Ok(Requirement::Exists {
        key: requirement.to_string(),
    })
}

const MAX_KEY_NAME_LEN: usize = 63;
/// Values may carry full object names (DNS subdomains), e.g. catalog names.
const MAX_VALUE_LEN: usize = 253;

fn is_name_char(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '-' | '_' | '.')
}

fn validate_key(key: &str, requirement: &str) -> Result<(), SelectorError> {
    let invalid = |reason| SelectorError::InvalidRequirement {
        requirement: requirement.to_string(),
        reason,
    };
    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            if prefix.is_empty() || !prefix.chars().all(is_name_char) {
                return Err(invalid("invalid key prefix"));
            }
            name
        }
        None => key,
    };
    if name.is_empty() {
        return Err(invalid("empty key"));
    }
    if name.len() > MAX_KEY_NAME_LEN || !name.chars().all(is_name_char) {
        return Err(invalid("invalid key name"));
    }
    Ok(())
}

fn validate_value(value: &str, requirement: &str) -> Result<(), SelectorError> {
    if value.len() > MAX_VALUE_LEN || !value.chars().all(is_name_char) {
        return Err(SelectorError::InvalidRequirement {
            requirement: requirement.to_string(),
            reason: "invalid value",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn parses_equality_and_inequality() {
        let selector = LabelSelector::parse(
            "application.giantswarm.io/catalog-visibility=public,application.giantswarm.io/catalog-type!=community",
        )
        .expect("selector");
        assert_eq!(selector.requirements().len(), 2);
        assert_eq!(
            selector.to_string(),
            "application.giantswarm.io/catalog-visibility=public,application.giantswarm.io/catalog-type!=community"
        );

        assert!(selector.matches(&labels(&[(
            "application.giantswarm.io/catalog-visibility",
            "public"
        )])));
        assert!(selector.matches(&labels(&[
            ("application.giantswarm.io/catalog-visibility", "public"),
            ("application.giantswarm.io/catalog-type", "stable"),
        ])));
        assert!(!selector.matches(&labels(&[
            ("application.giantswarm.io/catalog-visibility", "public"),
            ("application.giantswarm.io/catalog-type", "community"),
        ])));
        assert!(!selector.matches(&labels(&[(
            "application.giantswarm.io/catalog-visibility",
            "internal"
        )])));
    }

    #[test]
    fn parses_existence_requirements() {
        let selector = LabelSelector::parse("latest, !deprecated").expect("selector");
        assert!(selector.matches(&labels(&[("latest", "true")])));
        assert!(!selector.matches(&labels(&[("latest", "true"), ("deprecated", "yes")])));
        assert!(!selector.matches(&labels(&[])));
        assert_eq!(selector.to_string(), "latest,!deprecated");
    }

    #[test]
    fn double_equals_is_equality() {
        let selector = LabelSelector::parse("app.kubernetes.io/name==app-operator").expect("selector");
        assert_eq!(selector.to_string(), "app.kubernetes.io/name=app-operator");
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert_eq!(LabelSelector::parse(" "), Err(SelectorError::Empty));
        assert!(LabelSelector::parse("a=b,").is_err());
        assert!(LabelSelector::parse("=value").is_err());
        assert!(LabelSelector::parse("key=va lue").is_err());
        assert!(LabelSelector::parse("/name=x").is_err());
        assert!("key!=".parse::<LabelSelector>().is_ok());
    }

    #[test]
    fn from_pairs_validates_values() {
        let selector = LabelSelector::from_pairs([
            ("application.giantswarm.io/catalog", "giantswarm"),
            ("latest", "true"),
        ])
        .expect("selector");
        assert_eq!(
            selector.to_string(),
            "application.giantswarm.io/catalog=giantswarm,latest=true"
        );
        assert!(LabelSelector::from_pairs([("latest", "not valid")]).is_err());
        assert_eq!(
            LabelSelector::from_pairs(std::iter::empty::<(&str, &str)>()),
            Err(SelectorError::Empty)
        );
    }

    #[test]
    fn values_may_be_long_object_names() {
        let catalog = format!("catalog-{}", "x".repeat(80));
        let selector =
            LabelSelector::from_pairs([("application.giantswarm.io/catalog", catalog.as_str())])
                .expect("long value");
        assert!(selector.matches(&labels(&[(
            "application.giantswarm.io/catalog",
            catalog.as_str()
        )])));

        let too_long = "x".repeat(MAX_VALUE_LEN + 1);
        assert!(LabelSelector::from_pairs([("latest", too_long.as_str())]).is_err());
        let long_key = "k".repeat(MAX_KEY_NAME_LEN + 1);
        assert!(LabelSelector::from_pairs([(long_key.as_str(), "true")]).is_err());
    }
}
