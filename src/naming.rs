//! Identifier derivation for generated code.

/// Upper-camel-case a schema title.
///
/// Whitespace runs, underscores and hyphens separate words; the first
/// character of every word is upper-cased and the rest is kept as written.
pub fn upper_camel_case(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect()
}

/// Derive a type name from a dotted key path.
///
/// Uses the last segment. Positional segments (tuple items) become `Item<n>`.
pub fn name_from_key(key: &str) -> String {
    let segment = key.rsplit('.').next().unwrap_or_default();
    if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
        return format!("Item{}", segment);
    }
    upper_camel_case(segment)
}

/// Build a handler name such as `getUserList` from a link title and method.
pub fn link_function_name(title: &str, method: &str, suffix: &str) -> String {
    format!(
        "{}{}{}",
        method.to_ascii_lowercase(),
        upper_camel_case(title),
        suffix
    )
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_cases_spaces_and_underscores() {
        assert_eq!(upper_camel_case("user profile"), "UserProfile");
        assert_eq!(upper_camel_case("user_profile"), "UserProfile");
        assert_eq!(upper_camel_case("  user \t  profile_ "), "UserProfile");
        assert_eq!(upper_camel_case("api-key"), "ApiKey");
    }

    #[test]
    fn camel_case_keeps_inner_case() {
        assert_eq!(upper_camel_case("oAuth token"), "OAuthToken");
        assert_eq!(upper_camel_case("URL"), "URL");
    }

    #[test]
    fn camel_case_is_stable_across_normalization() {
        assert_eq!(upper_camel_case("blog post"), upper_camel_case("blog_post"));
        assert_eq!(
            upper_camel_case("blog   post"),
            upper_camel_case("blog post")
        );
    }

    #[test]
    fn camel_case_empty() {
        assert_eq!(upper_camel_case(""), "");
        assert_eq!(upper_camel_case(" _ "), "");
    }

    #[test]
    fn name_from_key_uses_last_segment() {
        assert_eq!(name_from_key("user.home_address"), "HomeAddress");
        assert_eq!(name_from_key("user"), "User");
        assert_eq!(name_from_key("point.coordinates.1"), "Item1");
        assert_eq!(name_from_key(""), "");
    }

    #[test]
    fn link_function_names() {
        assert_eq!(link_function_name("user list", "GET", ""), "getUserList");
        assert_eq!(link_function_name("user", "POST", "Handler"), "postUserHandler");
    }
}
