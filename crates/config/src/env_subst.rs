/// Replace `${ENV_VAR}` placeholders in config text.
///
/// Unresolvable variables are left as-is so the parse error names them.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Placeholder replacement with an injected lookup, testable without
/// touching the process environment.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => result.push_str(&value),
                    None => {
                        result.push_str("${");
                        result.push_str(name);
                        result.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            // "${}" or an unclosed brace: emit literally and move on.
            _ => {
                result.push_str("${");
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "BOT_TOKEN" => Some("123:ABC".to_string()),
            "NOTION_TOKEN" => Some("secret_x".to_string()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_vars() {
        assert_eq!(
            substitute_env_with("token = \"${BOT_TOKEN}\"", lookup),
            "token = \"123:ABC\""
        );
    }

    #[test]
    fn substitutes_several_in_one_pass() {
        assert_eq!(
            substitute_env_with("${BOT_TOKEN}/${NOTION_TOKEN}", lookup),
            "123:ABC/secret_x"
        );
    }

    #[test]
    fn leaves_unknown_placeholder() {
        assert_eq!(
            substitute_env_with("${TALLY_UNSET_XYZ}", lookup),
            "${TALLY_UNSET_XYZ}"
        );
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(substitute_env_with("no placeholders", lookup), "no placeholders");
    }

    #[test]
    fn malformed_placeholders_stay_literal() {
        assert_eq!(substitute_env_with("${}", lookup), "${}");
        assert_eq!(substitute_env_with("tail ${BOT_TOKEN", lookup), "tail ${BOT_TOKEN");
    }
}
