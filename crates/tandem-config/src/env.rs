use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Matches `{{ env.VAR }}` and `{{ env.VAR | default("fallback") }}`
fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

/// Expand environment placeholders in raw TOML text
///
/// Comment lines are left untouched so that commented-out entries never
/// require their variables to be set.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut expanded = Vec::new();

    for line in input.split('\n') {
        if line.trim_start().starts_with('#') {
            expanded.push(line.to_owned());
            continue;
        }

        let mut failure = None;
        let replaced = placeholder().replace_all(line, |caps: &Captures<'_>| match resolve(caps) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        });

        if let Some(e) = failure {
            return Err(e);
        }
        expanded.push(replaced.into_owned());
    }

    Ok(expanded.join("\n"))
}

fn resolve(caps: &Captures<'_>) -> Result<String, String> {
    let key = &caps[1];
    let Some(var) = key.strip_prefix("env.").filter(|v| !v.is_empty() && !v.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(var), caps.get(2)) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.as_str().to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{var}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "[llm]\ndefault_provider = \"groq\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn expands_set_variable() {
        temp_env::with_var("TANDEM_TEST_KEY", Some("sk-123"), || {
            let out = expand_env("api_key = \"{{ env.TANDEM_TEST_KEY }}\"").unwrap();
            assert_eq!(out, "api_key = \"sk-123\"");
        });
    }

    #[test]
    fn missing_variable_is_an_error() {
        temp_env::with_var_unset("TANDEM_MISSING", || {
            let err = expand_env("api_key = \"{{ env.TANDEM_MISSING }}\"").unwrap_err();
            assert!(err.contains("TANDEM_MISSING"));
        });
    }

    #[test]
    fn default_used_when_unset() {
        temp_env::with_var_unset("TANDEM_OPTIONAL", || {
            let out = expand_env("base_url = \"{{ env.TANDEM_OPTIONAL | default(\"http://localhost:11434/v1\") }}\"")
                .unwrap();
            assert_eq!(out, "base_url = \"http://localhost:11434/v1\"");
        });
    }

    #[test]
    fn set_variable_wins_over_default() {
        temp_env::with_var("TANDEM_OPTIONAL", Some("http://gpu:8080/v1"), || {
            let out = expand_env("base_url = \"{{ env.TANDEM_OPTIONAL | default(\"x\") }}\"").unwrap();
            assert_eq!(out, "base_url = \"http://gpu:8080/v1\"");
        });
    }

    #[test]
    fn commented_lines_are_skipped() {
        temp_env::with_var_unset("TANDEM_MISSING", || {
            let input = "  # api_key = \"{{ env.TANDEM_MISSING }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }

    #[test]
    fn rejects_unscoped_variables() {
        let err = expand_env("key = \"{{ secrets.TOKEN }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn keeps_trailing_newline() {
        temp_env::with_var("TANDEM_TEST_KEY", Some("v"), || {
            assert_eq!(expand_env("a = \"{{ env.TANDEM_TEST_KEY }}\"\n").unwrap(), "a = \"v\"\n");
        });
    }
}
