/// `intro-title` → `introTitle`, `need_for_donations` → `needForDonations`.
///
/// Ids without separators are returned unchanged, so already-camel keys map
/// to themselves.
pub fn camel_case(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut upper_next = false;
    for ch in id.chars() {
        if matches!(ch, '-' | '_' | ' ') {
            // Leading separators are dropped rather than capitalizing the first letter.
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::camel_case;

    #[test]
    fn kebab_and_snake() {
        assert_eq!(camel_case("intro-title"), "introTitle");
        assert_eq!(camel_case("hero-image"), "heroImage");
        assert_eq!(camel_case("need_for_donations"), "needForDonations");
        assert_eq!(camel_case("step-2-text"), "step2Text");
    }

    #[test]
    fn passthrough() {
        assert_eq!(camel_case("heroImage"), "heroImage");
        assert_eq!(camel_case("title"), "title");
        assert_eq!(camel_case("-lead"), "lead");
        assert_eq!(camel_case(""), "");
    }
}
