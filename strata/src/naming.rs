//! Table and view naming.
//!
//! Child types are read through a view whose name carries a reserved prefix, while their own
//! attributes live in a writable table named without it. The mapping is a policy so that
//! deployments with other conventions can plug in their own.

use convert_case::{Case, Casing};

/// Reserved marker distinguishing logical read views from writable tables.
pub const VIEW_PREFIX: &str = "view_";

/// Separator of namespaced type names, e.g. `Admin::User`.
pub const NAMESPACE_SEPARATOR: &str = "::";

pub trait NamingPolicy {
    /// Default table name for a type that does not configure one.
    fn default_table_name(&self, type_name: &str) -> String;
    /// Name of the read view built on top of a base table name.
    fn view_name(&self, table_name: &str) -> String;
    /// Name of the writable table behind a read view.
    fn writable_table_name(&self, view_name: &str) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixNaming {
    pub prefix: String,
}

impl PrefixNaming {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for PrefixNaming {
    fn default() -> Self {
        Self::new(VIEW_PREFIX)
    }
}

impl NamingPolicy for PrefixNaming {
    fn default_table_name(&self, type_name: &str) -> String {
        tableize(type_name)
    }

    fn view_name(&self, table_name: &str) -> String {
        format!("{}{}", self.prefix, table_name)
    }

    fn writable_table_name(&self, view_name: &str) -> String {
        match view_name.strip_prefix(self.prefix.as_str()) {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => view_name.to_string(),
        }
    }
}

/// `Admin::BlogPost` -> `admin_blog_posts`
pub fn tableize(type_name: &str) -> String {
    let segments: Vec<String> = type_name
        .split(NAMESPACE_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_case(Case::Snake))
        .collect();
    match segments.split_last() {
        Some((last, namespace)) => {
            let mut parts = namespace.to_vec();
            parts.push(pluralize(last));
            parts.join("_")
        }
        None => String::new(),
    }
}

/// English plural of the last word of a snake_case name.
pub fn pluralize(word: &str) -> String {
    let (head, last) = match word.rfind('_') {
        Some(idx) => word.split_at(idx + 1),
        None => ("", word),
    };
    let plural = match last {
        "" => String::new(),
        "person" => "people".to_string(),
        "child" => "children".to_string(),
        "man" => "men".to_string(),
        "woman" => "women".to_string(),
        _ if last.ends_with("ss") || last.ends_with("sh") || last.ends_with("ch") || last.ends_with('x') || last.ends_with('z') => {
            format!("{}es", last)
        }
        _ if last.ends_with('s') => last.to_string(),
        _ if last.ends_with('y') && !ends_with_vowel_before_y(last) => format!("{}ies", &last[..last.len() - 1]),
        _ => format!("{}s", last),
    };
    format!("{}{}", head, plural)
}

fn ends_with_vowel_before_y(word: &str) -> bool {
    word.chars().rev().nth(1).map(|c| "aeiou".contains(c)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tableize_pluralizes_and_flattens_namespaces() {
        assert_eq!(tableize("Animal"), "animals");
        assert_eq!(tableize("BlogPost"), "blog_posts");
        assert_eq!(tableize("Admin::Category"), "admin_categories");
        assert_eq!(tableize("Box"), "boxes");
        assert_eq!(tableize("Person"), "people");
        assert_eq!(tableize("Day"), "days");
        assert_eq!(tableize("Status"), "status");
    }

    #[test]
    fn view_and_writable_names_are_inverse() {
        let naming = PrefixNaming::default();
        let view = naming.view_name("dogs");
        assert_eq!(view, "view_dogs");
        assert_eq!(naming.writable_table_name(&view), "dogs");
    }

    #[test]
    fn writable_name_without_prefix_is_unchanged() {
        let naming = PrefixNaming::default();
        assert_eq!(naming.writable_table_name("dogs"), "dogs");
        assert_eq!(naming.writable_table_name("view_"), "view_");
    }

    #[test]
    fn custom_prefix_is_honoured() {
        let naming = PrefixNaming::new("v_");
        assert_eq!(naming.view_name("cats"), "v_cats");
        assert_eq!(naming.writable_table_name("v_cats"), "cats");
        assert_eq!(naming.writable_table_name("view_cats"), "view_cats");
    }
}
