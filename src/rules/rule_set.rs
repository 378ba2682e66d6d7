//! Alias-keyed rule collections

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::rules::Rule;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("rule alias '{0}' is already defined")]
    DuplicateAlias(String),
}

/// A set of rules keyed by alias. Iteration is always in alias order.
///
/// Rules are shared, so cloning a set is cheap.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<String, Arc<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        let alias = rule.alias().to_string();
        if self.rules.contains_key(&alias) {
            return Err(RegistryError::DuplicateAlias(alias));
        }
        self.rules.insert(alias, rule);
        Ok(())
    }

    /// A copy of this set without the given aliases. Unknown aliases are ignored.
    pub fn except<S: AsRef<str>>(&self, aliases: &[S]) -> RuleSet {
        let rules = self
            .rules
            .iter()
            .filter(|(alias, _)| !aliases.iter().any(|a| a.as_ref() == alias.as_str()))
            .map(|(alias, rule)| (alias.clone(), Arc::clone(rule)))
            .collect();
        RuleSet { rules }
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.rules.contains_key(alias)
    }

    pub fn get(&self, alias: &str) -> Option<&dyn Rule> {
        self.rules.get(alias).map(|r| &**r)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.values().map(|r| &**r)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.rules.keys()).finish()
    }
}
