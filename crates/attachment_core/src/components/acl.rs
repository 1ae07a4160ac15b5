//! Flat access control list for the admin stand-in.
//!
//! # Invariants
//! - `None` resource or privilege in a rule matches anything.
//! - A matching deny always wins over a matching allow.
//! - Queries no rule matches are denied.

use std::cell::RefCell;

#[derive(Debug, Clone)]
struct Rule {
    role: String,
    resource: Option<String>,
    privilege: Option<String>,
    allow: bool,
}

impl Rule {
    fn matches(&self, role: &str, resource: &str, privilege: &str) -> bool {
        self.role == role
            && self.resource.as_deref().map_or(true, |value| value == resource)
            && self.privilege.as_deref().map_or(true, |value| value == privilege)
    }
}

#[derive(Debug, Default)]
pub struct Acl {
    rules: RefCell<Vec<Rule>>,
}

impl Acl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(&self, role: &str, resource: Option<&str>, privilege: Option<&str>) {
        self.push_rule(role, resource, privilege, true);
    }

    pub fn deny(&self, role: &str, resource: Option<&str>, privilege: Option<&str>) {
        self.push_rule(role, resource, privilege, false);
    }

    pub fn is_allowed(&self, role: &str, resource: &str, privilege: &str) -> bool {
        let rules = self.rules.borrow();
        let mut matching = rules
            .iter()
            .filter(|rule| rule.matches(role, resource, privilege))
            .peekable();
        matching.peek().is_some() && matching.all(|rule| rule.allow)
    }

    fn push_rule(&self, role: &str, resource: Option<&str>, privilege: Option<&str>, allow: bool) {
        self.rules.borrow_mut().push(Rule {
            role: role.to_string(),
            resource: resource.map(str::to_string),
            privilege: privilege.map(str::to_string),
            allow,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::Acl;

    #[test]
    fn unmatched_queries_are_denied() {
        let acl = Acl::new();
        acl.allow("editor", Some("admin"), Some("view"));

        assert!(acl.is_allowed("editor", "admin", "view"));
        assert!(!acl.is_allowed("editor", "admin", "delete"));
        assert!(!acl.is_allowed("nobody", "admin", "view"));
    }

    #[test]
    fn deny_beats_wildcard_allow() {
        let acl = Acl::new();
        acl.allow("admin", None, None);
        acl.deny("admin", Some("admin"), Some("delete"));

        assert!(acl.is_allowed("admin", "admin", "edit"));
        assert!(!acl.is_allowed("admin", "admin", "delete"));
    }
}
