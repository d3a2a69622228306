//! Slash-command recognition and submission field parsing.

use crate::error::LedgerError;

/// Field layout of an inline submission.
pub const USAGE_INLINE: &str = "name:string,in:number,out:number,when:string";
/// Field layout of a two-step submission.
pub const USAGE_TWO_STEP: &str = "name:string,in:number,out:number";
/// Layout of the `/when` command.
pub const USAGE_WHEN: &str = "/when <name>";

/// A message that starts with a slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/refresh`: re-query the relation cache and report the names.
    Refresh,
    /// `/when <name>`: select the pending relation for later records.
    When(String),
    /// Any other slash token.
    Unknown(String),
}

impl Command {
    /// Recognize a slash command; plain text returns `None`.
    ///
    /// Group-chat clients append `@BotName` to the command token, so the
    /// suffix is stripped before matching.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix('/')?;
        let mut parts = rest.splitn(2, char::is_whitespace);
        let token = parts.next().unwrap_or_default();
        let arg = parts.next().unwrap_or_default();
        let name = token.split('@').next().unwrap_or(token);
        match name {
            "refresh" => Some(Self::Refresh),
            "when" => Some(Self::When(arg.trim().to_string())),
            _ => Some(Self::Unknown(name.to_string())),
        }
    }
}

/// Split a comma-separated submission into trimmed fields.
#[must_use]
pub fn split_fields(text: &str) -> Vec<String> {
    text.split(',').map(|field| field.trim().to_string()).collect()
}

/// Parse an in/out amount. Amounts are whole numbers; anything else,
/// including decimals, is rejected rather than truncated.
pub fn parse_amount(field: &str) -> Result<i64, LedgerError> {
    field.parse().map_err(|_| LedgerError::InvalidNumber)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/refresh", Command::Refresh)]
    #[case("  /refresh  ", Command::Refresh)]
    #[case("/refresh@TallyBot", Command::Refresh)]
    #[case("/when Friday", Command::When("Friday".into()))]
    #[case("/when@TallyBot Friday evening", Command::When("Friday evening".into()))]
    #[case("/when", Command::When(String::new()))]
    #[case("/when   ", Command::When(String::new()))]
    #[case("/start", Command::Unknown("start".into()))]
    fn commands_are_recognized(#[case] text: &str, #[case] expected: Command) {
        assert_eq!(Command::parse(text), Some(expected));
    }

    #[rstest]
    #[case("Lunch,20,35,Monday")]
    #[case("plain text")]
    #[case("")]
    fn plain_text_is_not_a_command(#[case] text: &str) {
        assert_eq!(Command::parse(text), None);
    }

    #[test]
    fn fields_are_split_and_trimmed() {
        assert_eq!(
            split_fields(" Lunch , 20 ,35, Monday"),
            ["Lunch", "20", "35", "Monday"]
        );
    }

    #[test]
    fn empty_fields_are_kept() {
        assert_eq!(split_fields("a,,b,"), ["a", "", "b", ""]);
    }

    #[rstest]
    #[case("20", 20)]
    #[case("-5", -5)]
    #[case("0", 0)]
    fn whole_numbers_parse(#[case] field: &str, #[case] expected: i64) {
        assert_eq!(parse_amount(field).unwrap(), expected);
    }

    #[rstest]
    #[case("20.5")]
    #[case("abc")]
    #[case("")]
    #[case("1 2")]
    fn non_integers_are_rejected(#[case] field: &str) {
        assert!(matches!(
            parse_amount(field),
            Err(LedgerError::InvalidNumber)
        ));
    }
}
