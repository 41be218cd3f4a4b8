/// URL slugs for catalog rows (resources, categories, tags)

/// Lowercases ASCII alphanumerics and collapses every other run of
/// characters into a single `-`, trimming dashes at both ends.
///
/// ```
/// use gauss_shared::slug::slugify;
///
/// assert_eq!(slugify("React Documentation"), "react-documentation");
/// assert_eq!(slugify("CI/CD"), "ci-cd");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
