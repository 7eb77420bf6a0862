//! Manifest parser: converts raw text in either accepted syntax into an
//! ordered sequence of [`Directive`] records.

use super::directive::{Directive, DirectiveKind};
use crate::error::ManifestError;

/// Supported manifest input syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// Line-oriented directive syntax (`FROM`, `AGENT`, `CMD`, ...).
    Directives,
    /// Structured YAML syntax (`apiVersion: v1` / `kind: Agent`).
    Yaml,
}

/// Guess the input format from the content itself.
///
/// A YAML mapping carrying both `apiVersion` and `kind` keys selects the
/// structured syntax; everything else is treated as directive lines.
pub fn detect_format(content: &str) -> ManifestFormat {
    if let Ok(serde_yaml::Value::Mapping(map)) = serde_yaml::from_str::<serde_yaml::Value>(content)
    {
        let has = |key: &str| map.keys().any(|k| k.as_str() == Some(key));
        if has("apiVersion") && has("kind") {
            return ManifestFormat::Yaml;
        }
    }
    ManifestFormat::Directives
}

/// Parse manifest content into directive records.
pub fn parse_manifest(
    content: &str,
    format: ManifestFormat,
) -> Result<Vec<Directive>, ManifestError> {
    match format {
        ManifestFormat::Directives => parse_directive_lines(content),
        ManifestFormat::Yaml => super::structured::parse_structured(content),
    }
}

/// Line-oriented front-end.
///
/// Each logical directive starts at column zero with a case-insensitive
/// keyword; a trailing backslash continues the logical line; blank lines and
/// `#` comments are skipped. `INSTRUCTION` keeps its whole remainder as one
/// free-text argument, with continuation joins collapsed to single spaces.
fn parse_directive_lines(content: &str) -> Result<Vec<Directive>, ManifestError> {
    let lines: Vec<&str> = content.lines().collect();
    let mut directives = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let raw = lines[i];
        let line_no = i + 1;
        i += 1;

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if raw.starts_with(char::is_whitespace) {
            return Err(parse_error(
                line_no,
                format!("directive must start at column zero: {trimmed}"),
            ));
        }

        // Fold continuation lines into one logical line.
        let mut logical = raw.trim_end().to_string();
        while let Some(stripped) = logical.strip_suffix('\\') {
            let head = stripped.trim_end().to_string();
            match lines.get(i) {
                Some(next) => {
                    i += 1;
                    logical = format!("{} {}", head, next.trim());
                }
                None => {
                    logical = head;
                    break;
                }
            }
        }

        let (keyword, rest) = match logical.split_once(char::is_whitespace) {
            Some((kw, rest)) => (kw, rest.trim()),
            None => (logical.as_str(), ""),
        };
        let kind = DirectiveKind::from_keyword(keyword)
            .ok_or_else(|| parse_error(line_no, format!("unknown directive: {keyword}")))?;
        directives.push(lower_line(kind, keyword, rest, line_no)?);
    }

    Ok(directives)
}

/// Convert one logical line into a directive record.
fn lower_line(
    kind: DirectiveKind,
    keyword: &str,
    rest: &str,
    line: usize,
) -> Result<Directive, ManifestError> {
    if kind.opens_block() {
        let name = single_token(keyword, "a name", rest, line)?;
        return Ok(Directive::opener(kind, name));
    }
    if kind.takes_free_text() {
        if rest.is_empty() {
            return Err(missing(keyword, "a text body", line));
        }
        return Ok(Directive::new(kind, vec![rest.to_string()]));
    }

    let args = match kind {
        DirectiveKind::From => vec![single_token(keyword, "an image reference", rest, line)?],
        DirectiveKind::Framework => vec![single_token(keyword, "a framework name", rest, line)?],
        DirectiveKind::Model => vec![single_token(keyword, "a model identifier", rest, line)?],
        DirectiveKind::Workdir => vec![single_token(keyword, "a directory", rest, line)?],
        DirectiveKind::Transport => vec![single_token(keyword, "a transport", rest, line)?],
        DirectiveKind::Url => vec![single_token(keyword, "a url", rest, line)?],
        DirectiveKind::Secret => split_assignment(rest)
            .ok_or_else(|| missing(keyword, "a secret name", line))
            .map(|(name, value)| match value {
                Some(value) => vec![name, value],
                None => vec![name],
            })?,
        DirectiveKind::Env => match split_assignment(rest) {
            Some((key, Some(value))) => vec![key, value],
            _ => return Err(missing(keyword, "a KEY=VALUE assignment", line)),
        },
        DirectiveKind::Run | DirectiveKind::Command => {
            if rest.is_empty() {
                return Err(missing(keyword, "an argument", line));
            }
            vec![rest.to_string()]
        }
        DirectiveKind::Copy => {
            let tokens = whitespace_tokens(rest);
            if tokens.len() < 2 {
                return Err(missing(keyword, "a source and a destination", line));
            }
            tokens
        }
        DirectiveKind::Expose | DirectiveKind::Args => {
            let tokens = whitespace_tokens(rest);
            if tokens.is_empty() {
                return Err(missing(keyword, "at least one argument", line));
            }
            tokens
        }
        DirectiveKind::Servers | DirectiveKind::Sequence | DirectiveKind::Agents => {
            let tokens = name_list(rest);
            if tokens.is_empty() {
                return Err(missing(keyword, "at least one name", line));
            }
            tokens
        }
        DirectiveKind::Cmd | DirectiveKind::Entrypoint => command_args(keyword, rest, line)?,
        DirectiveKind::UseHistory
        | DirectiveKind::Cumulative
        | DirectiveKind::HumanInput => {
            vec![single_token(keyword, "a boolean", rest, line)?]
        }
        // A bare DEFAULT marks the entity; an explicit boolean is accepted.
        DirectiveKind::Default => {
            if rest.is_empty() {
                vec!["true".to_string()]
            } else {
                vec![single_token(keyword, "a boolean", rest, line)?]
            }
        }
        DirectiveKind::MaxIterations | DirectiveKind::PlanIterations => {
            vec![single_token(keyword, "an integer", rest, line)?]
        }
        DirectiveKind::PlanType => vec![single_token(keyword, "a plan type", rest, line)?],
        // Openers and free-text directives are handled above.
        DirectiveKind::Server
        | DirectiveKind::Agent
        | DirectiveKind::Chain
        | DirectiveKind::Router
        | DirectiveKind::Orchestrator
        | DirectiveKind::Instruction => unreachable!("handled before argument lowering"),
    };

    Ok(Directive::new(kind, args))
}

/// `CMD`/`ENTRYPOINT` accept a JSON array remainder or whitespace tokens.
fn command_args(keyword: &str, rest: &str, line: usize) -> Result<Vec<String>, ManifestError> {
    if rest.is_empty() {
        return Err(missing(keyword, "a command", line));
    }
    if rest.starts_with('[') {
        return serde_json::from_str::<Vec<String>>(rest)
            .map_err(|e| parse_error(line, format!("{keyword} expects a JSON string array: {e}")));
    }
    Ok(rest.split_whitespace().map(str::to_string).collect())
}

/// Split `NAME`, `NAME=VALUE` or `NAME VALUE`; `None` when empty.
fn split_assignment(rest: &str) -> Option<(String, Option<String>)> {
    if rest.is_empty() {
        return None;
    }
    let eq = rest.find('=');
    let space = rest.find(char::is_whitespace);
    match (eq, space) {
        (Some(eq), space) if space.map_or(true, |s| eq < s) => {
            let (key, value) = rest.split_at(eq);
            Some((key.to_string(), Some(value[1..].to_string())))
        }
        (_, Some(space)) => {
            let (key, value) = rest.split_at(space);
            Some((key.to_string(), Some(value.trim().to_string())))
        }
        _ => Some((rest.to_string(), None)),
    }
}

/// Comma- or whitespace-separated name list.
fn name_list(rest: &str) -> Vec<String> {
    rest.split([',', ' ', '\t'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn whitespace_tokens(rest: &str) -> Vec<String> {
    rest.split_whitespace().map(str::to_string).collect()
}

fn single_token(
    keyword: &str,
    what: &str,
    rest: &str,
    line: usize,
) -> Result<String, ManifestError> {
    let mut tokens = rest.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(token), None) => Ok(token.to_string()),
        (Some(_), Some(extra)) => Err(parse_error(
            line,
            format!("{keyword} expects {what}, found trailing token: {extra}"),
        )),
        (None, _) => Err(missing(keyword, what, line)),
    }
}

fn missing(keyword: &str, what: &str, line: usize) -> ManifestError {
    parse_error(line, format!("{keyword} requires {what}"))
}

fn parse_error(line: usize, message: String) -> ManifestError {
    ManifestError::Parse { line, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let text = "FROM base:latest\nAGENT a\nINSTRUCTION do X\nCMD [\"run\"]\n";
        let directives = parse_manifest(text, ManifestFormat::Directives).unwrap();
        assert_eq!(directives.len(), 4);
        assert_eq!(directives[0].kind, DirectiveKind::From);
        assert_eq!(directives[0].args, vec!["base:latest"]);
        assert_eq!(directives[1].block_name.as_deref(), Some("a"));
        assert_eq!(directives[2].args, vec!["do X"]);
        assert_eq!(directives[3].args, vec!["run"]);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let text = "from base:latest\nagent a\ninstruction do X\n";
        let directives = parse_directive_lines(text).unwrap();
        assert_eq!(directives[0].kind, DirectiveKind::From);
        assert_eq!(directives[1].kind, DirectiveKind::Agent);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = "# header\n\nFROM base:latest\n   # indented comment\n";
        let directives = parse_directive_lines(text).unwrap();
        assert_eq!(directives.len(), 1);
    }

    #[test]
    fn test_instruction_free_text_preserved() {
        let text = "AGENT a\nINSTRUCTION Summarize the  user's  request verbatim.\n";
        let directives = parse_directive_lines(text).unwrap();
        assert_eq!(
            directives[1].args,
            vec!["Summarize the  user's  request verbatim."]
        );
    }

    #[test]
    fn test_continuation_collapses_to_single_spaces() {
        let text = "AGENT a\nINSTRUCTION You are a careful \\\n    reviewer of code \\\n    changes.\n";
        let directives = parse_directive_lines(text).unwrap();
        assert_eq!(
            directives[1].args,
            vec!["You are a careful reviewer of code changes."]
        );
    }

    #[test]
    fn test_unknown_keyword_carries_line() {
        let text = "FROM base:latest\nVOLUME /data\n";
        let err = parse_directive_lines(text).unwrap_err();
        match err {
            ManifestError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("VOLUME"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_argument_named() {
        let err = parse_directive_lines("AGENT\n").unwrap_err();
        assert!(err.to_string().contains("AGENT requires a name"));

        let err = parse_directive_lines("FROM\n").unwrap_err();
        assert!(err.to_string().contains("an image reference"));
    }

    #[test]
    fn test_env_splits_on_first_equals() {
        let directives = parse_directive_lines("ENV URL=http://x?a=b\n").unwrap();
        assert_eq!(directives[0].args, vec!["URL", "http://x?a=b"]);
    }

    #[test]
    fn test_env_space_fallback() {
        let directives = parse_directive_lines("ENV KEY some value\n").unwrap();
        assert_eq!(directives[0].args, vec!["KEY", "some value"]);
    }

    #[test]
    fn test_env_without_value_is_error() {
        let err = parse_directive_lines("ENV KEY\n").unwrap_err();
        assert!(err.to_string().contains("KEY=VALUE"));
    }

    #[test]
    fn test_secret_forms() {
        let directives =
            parse_directive_lines("SECRET OPENAI_API_KEY\nSECRET OTHER_KEY=abc123\n").unwrap();
        assert_eq!(directives[0].args, vec!["OPENAI_API_KEY"]);
        assert_eq!(directives[1].args, vec!["OTHER_KEY", "abc123"]);
    }

    #[test]
    fn test_cmd_json_array_and_tokens() {
        let directives =
            parse_directive_lines("CMD [\"python\", \"agent.py\"]\n").unwrap();
        assert_eq!(directives[0].args, vec!["python", "agent.py"]);

        let directives = parse_directive_lines("CMD python agent.py\n").unwrap();
        assert_eq!(directives[0].args, vec!["python", "agent.py"]);

        let err = parse_directive_lines("CMD [\"unterminated\n").unwrap_err();
        assert!(err.to_string().contains("JSON string array"));
    }

    #[test]
    fn test_sequence_accepts_commas_and_spaces() {
        let directives = parse_directive_lines("CHAIN c\nSEQUENCE gen, eval gen\n").unwrap();
        assert_eq!(directives[1].args, vec!["gen", "eval", "gen"]);
    }

    #[test]
    fn test_run_remainder_verbatim() {
        let directives =
            parse_directive_lines("RUN pip install --no-cache-dir -r requirements.txt\n").unwrap();
        assert_eq!(
            directives[0].args,
            vec!["pip install --no-cache-dir -r requirements.txt"]
        );
    }

    #[test]
    fn test_indented_directive_rejected() {
        let err = parse_directive_lines("FROM base\n  AGENT a\n").unwrap_err();
        assert!(err.to_string().contains("column zero"));
    }

    #[test]
    fn test_bare_default() {
        let directives = parse_directive_lines("CHAIN c\nDEFAULT\n").unwrap();
        assert_eq!(directives[1].args, vec!["true"]);
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format("apiVersion: v1\nkind: Agent\n"),
            ManifestFormat::Yaml
        );
        assert_eq!(
            detect_format("FROM base:latest\nAGENT a\n"),
            ManifestFormat::Directives
        );
        assert_eq!(detect_format(""), ManifestFormat::Directives);
    }
}
