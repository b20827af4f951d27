//! Cache region naming.
//!
//! A region name is the collection name of a resource type: the type name
//! with a lower-cased first letter, pluralized. Hrefs embed the same
//! collection name right before the resource id, so nested resources found
//! in a response can be routed to the region their own type would use.

/// Region name for a resource type name.
///
/// `Account` → `accounts`, `Directory` → `directories`,
/// `CustomData` → `customData`.
pub fn region_for_type(type_name: &str) -> String {
    let mut chars = type_name.chars();
    let camel = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
        None => return String::new(),
    };
    pluralize(&camel)
}

/// Sub-resources that exist once per parent and are addressed by name
/// (`/accounts/1/customData`) rather than by id.
const SINGLETON_SEGMENTS: &[&str] = &[
    "customData",
    "passwordPolicy",
    "accountCreationPolicy",
    "provider",
    "providerData",
];

/// Region name for a resource href: the path segment naming its collection.
///
/// A trailing singleton sub-resource maps to the region of its own type.
pub fn region_for_href(href: &str) -> Option<String> {
    let url = url::Url::parse(href).ok()?;
    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        [.., _parent, singleton] if SINGLETON_SEGMENTS.contains(singleton) => {
            Some(region_for_type(singleton))
        }
        [.., collection, _id] => Some((*collection).to_string()),
        _ => None,
    }
}

fn pluralize(word: &str) -> String {
    if word.ends_with("Data") || word.ends_with("data") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
    }
    if word.ends_with('s') || word.ends_with('x') || word.ends_with("ch") || word.ends_with("sh") {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_for_type() {
        assert_eq!(region_for_type("Account"), "accounts");
        assert_eq!(region_for_type("Directory"), "directories");
        assert_eq!(region_for_type("CustomData"), "customData");
        assert_eq!(region_for_type("AccountStoreMapping"), "accountStoreMappings");
        assert_eq!(region_for_type("Tenant"), "tenants");
        assert_eq!(region_for_type("Key"), "keys");
        assert_eq!(region_for_type("Status"), "statuses");
        assert_eq!(region_for_type(""), "");
    }

    #[test]
    fn test_region_names_do_not_collide() {
        let types = [
            "Account",
            "Application",
            "Directory",
            "Group",
            "GroupMembership",
            "Organization",
            "Tenant",
            "CustomData",
        ];
        let mut regions: Vec<String> = types.iter().map(|t| region_for_type(t)).collect();
        regions.sort();
        regions.dedup();
        assert_eq!(regions.len(), types.len());
    }

    #[test]
    fn test_region_for_href() {
        assert_eq!(
            region_for_href("https://api.example.com/v1/accounts/abc").as_deref(),
            Some("accounts")
        );
        assert_eq!(
            region_for_href("https://api.example.com/v1/directories/9/").as_deref(),
            Some("directories")
        );
        assert_eq!(
            region_for_href("https://api.example.com/v1/tenants/current").as_deref(),
            Some("tenants")
        );
        assert_eq!(
            region_for_href("https://api.example.com/v1/accounts/1/customData").as_deref(),
            Some(region_for_type("CustomData").as_str())
        );
        assert_eq!(
            region_for_href("https://api.example.com/v1/directories/9/passwordPolicy").as_deref(),
            Some(region_for_type("PasswordPolicy").as_str())
        );
        assert!(region_for_href("not a url").is_none());
        assert!(region_for_href("https://api.example.com/").is_none());
    }
}
