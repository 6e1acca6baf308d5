//! Resource kind registry
//!
//! Maps a kind name to its implementation. Groups bundle several kinds under
//! one name; a group may share its name with a kind, in which case the group
//! wins.

use crate::catalog::ResourceKind;
use crate::error::{CloudError, Result};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Default, Clone)]
pub struct Registry {
    kinds: Vec<Arc<dyn ResourceKind>>,
    groups: Vec<(String, Vec<String>)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a kind; a later kind with the same name replaces the earlier one
    pub fn register(&mut self, kind: impl ResourceKind + 'static) -> &mut Self {
        let kind: Arc<dyn ResourceKind> = Arc::new(kind);
        match self.kinds.iter().position(|k| k.name() == kind.name()) {
            Some(index) => self.kinds[index] = kind,
            None => self.kinds.push(kind),
        }
        self
    }

    pub fn group(&mut self, name: impl Into<String>, members: &[&str]) -> &mut Self {
        let name = name.into();
        let members = members.iter().map(|m| m.to_string()).collect();
        match self.groups.iter().position(|(g, _)| *g == name) {
            Some(index) => self.groups[index].1 = members,
            None => self.groups.push((name, members)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ResourceKind>> {
        self.kinds.iter().find(|k| k.name() == name).cloned()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &Arc<dyn ResourceKind>> {
        self.kinds.iter()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    /// Every name accepted by [`Registry::resolve`]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.iter().map(|k| k.name()).collect();
        for (group, _) in &self.groups {
            if !names.contains(&group.as_str()) {
                names.push(group.as_str());
            }
        }
        names
    }

    /// Expand kind and group names into kinds, keeping the requested order
    /// and dropping repeats
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn ResourceKind>>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for name in names {
            let name = name.as_ref();
            let members: Vec<&str> = match self.groups.iter().find(|(g, _)| g == name) {
                Some((_, members)) => members.iter().map(String::as_str).collect(),
                None => vec![name],
            };

            for member in members {
                let kind = self
                    .get(member)
                    .ok_or_else(|| CloudError::KindNotFound(member.to_string()))?;
                if seen.insert(kind.name().to_string()) {
                    resolved.push(kind);
                }
            }
        }

        Ok(resolved)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.kinds.iter().map(|k| k.name()).collect::<Vec<_>>())
            .field("groups", &self.groups)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl ResourceKind for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn included_resource_types(&self) -> &[&str] {
            &[]
        }

        async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
            Ok(Vec::new())
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register(Named("asg"))
            .register(Named("launch_template"))
            .register(Named("vpc"))
            .register(Named("igw"))
            .group("asg", &["asg", "launch_template"])
            .group("network", &["igw", "vpc"]);
        registry
    }

    fn names(kinds: &[Arc<dyn ResourceKind>]) -> Vec<&str> {
        kinds.iter().map(|k| k.name()).collect()
    }

    #[test]
    fn test_resolve_kinds_and_groups() {
        let registry = registry();
        let resolved = registry.resolve(&["vpc", "asg"]).unwrap();
        assert_eq!(names(&resolved), vec!["vpc", "asg", "launch_template"]);
    }

    #[test]
    fn test_resolve_drops_duplicates() {
        let registry = registry();
        let resolved = registry.resolve(&["network", "vpc", "igw"]).unwrap();
        assert_eq!(names(&resolved), vec!["igw", "vpc"]);
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = registry();
        let err = registry.resolve(&["vpc", "nope"]).err().unwrap();
        assert!(matches!(err, CloudError::KindNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_names() {
        let registry = registry();
        assert_eq!(
            registry.names(),
            vec!["asg", "launch_template", "vpc", "igw", "network"]
        );
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = registry();
        registry.register(Named("vpc"));
        assert_eq!(registry.kinds().count(), 4);
    }
}
