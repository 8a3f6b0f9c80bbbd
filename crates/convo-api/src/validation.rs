/// Trimmed view of caller input, or `None` when it is empty or
/// whitespace-only. Validation happens here, before any storage call;
/// the store itself places no constraint on its inputs.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(non_blank("  hi there "), Some("hi there"));
    }

    #[test]
    fn rejects_empty_and_whitespace_only() {
        assert_eq!(non_blank(""), None);
        assert_eq!(non_blank("   "), None);
        assert_eq!(non_blank("\t\n"), None);
    }
}
