/// Structured identity of a reference image: which category it belongs to
/// and where it sits in that category's consultation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceId {
    pub category_index: u32,
    pub position: Option<u32>,
}

impl ReferenceId {
    /// Parses a reference file stem such as `"3"`, `"03-2"` or `"3-title"`.
    ///
    /// The first dash-separated token must be all ASCII digits. A second
    /// all-digit token is taken as the explicit position.
    pub fn parse(stem: &str) -> Option<Self> {
        let mut parts = stem.split('-');
        let category_index = parse_digits(parts.next()?)?;
        let position = parts.next().and_then(parse_digits);
        Some(Self {
            category_index,
            position,
        })
    }
}

fn parse_digits(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::bare_index("3", 3, None)]
    #[case::leading_zero("03", 3, None)]
    #[case::with_position("1-2", 1, Some(2))]
    #[case::named_suffix("2-boss-fight", 2, None)]
    #[case::position_then_name("4-10-menu", 4, Some(10))]
    fn test_parse_valid(#[case] stem: &str, #[case] index: u32, #[case] position: Option<u32>) {
        let id = ReferenceId::parse(stem).unwrap();
        assert_eq!(id.category_index, index);
        assert_eq!(id.position, position);
    }

    #[rstest]
    #[case::empty("")]
    #[case::alpha_prefix("a-1")]
    #[case::mixed_token("1a-2")]
    #[case::leading_dash("-1")]
    #[case::overflow("99999999999-1")]
    fn test_parse_rejects(#[case] stem: &str) {
        assert!(ReferenceId::parse(stem).is_none());
    }
}
