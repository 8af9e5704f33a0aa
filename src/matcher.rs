//! URL path matcher
//!
//! Decides whether a decoded request path is covered by an entitlement
//! template. The substitution rule is narrow enough — `$identifier` stands
//! for exactly one non-empty path segment — that it's implemented directly
//! against `regex` rather than pulled in through a general templating
//! engine.

use regex::Regex;

/// Collapse runs of `/` to a single `/` and trim a leading `/`.
pub fn normalize(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut prev_was_slash = false;
    for c in path.chars() {
        if c == '/' {
            if prev_was_slash {
                continue;
            }
            prev_was_slash = true;
        } else {
            prev_was_slash = false;
        }
        collapsed.push(c);
    }
    collapsed.trim_start_matches('/').to_string()
}

/// Build the regex source for a normalized template body: `$identifier`
/// becomes `[^/]+` (one non-empty path segment); a bare `$` not followed by
/// an identifier character is a literal `$`; everything else is escaped
/// literally.
fn template_to_regex_source(body: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '$' {
            let mut j = i + 1;
            while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            if j > i + 1 {
                out.push_str("[^/]+");
                i = j;
                continue;
            }
        }
        out.push_str(&regex::escape(&chars[i].to_string()));
        i += 1;
    }
    out
}

/// Compile `template` into an anchored regex, or `None` for the "never
/// matches" empty template.
fn compile(template: &str) -> Option<Regex> {
    if template.is_empty() {
        return None;
    }
    let normalized = normalize(template);
    let body = normalized.trim_end_matches('/');
    let source = template_to_regex_source(body);
    // segment boundary after the template body, then anything: this gives
    // both the "prefix, any suffix" subtree semantics for a trailing-slash
    // template and the "exact segment boundary" semantics for one without,
    // since both require the next character (if any) to start a new
    // segment rather than continue the last matched one.
    let anchored = format!("^{source}(/.*)?$");
    Regex::new(&anchored).ok()
}

/// Does `template` cover `request_path`? Both sides are normalized before
/// comparison.
pub fn matches(template: &str, request_path: &str) -> bool {
    let Some(re) = compile(template) else {
        return false;
    };
    let path = normalize(request_path);
    re.is_match(&path)
}

/// Does any template in `templates` cover `request_path`?
pub fn matches_any<'a, I: IntoIterator<Item = &'a str>>(templates: I, request_path: &str) -> bool {
    templates.into_iter().any(|t| matches(t, request_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_template_never_matches() {
        assert!(!matches("", "pulp/repos/fedora-14/x86_64/"));
    }

    #[test]
    fn exact_literal_template_requires_literal_match() {
        assert!(matches(
            "repos/pulp/pulp/fedora-14/x86_64/",
            "repos/pulp/pulp/fedora-14/x86_64/"
        ));
        assert!(!matches(
            "repos/pulp/pulp/fedora-14/x86_64/",
            "repos/pulp/pulp/fedora-13/x86_64/"
        ));
    }

    #[test]
    fn variable_matches_exactly_one_segment() {
        assert!(matches("$releasever/os", "fedora-14/os"));
        assert!(matches("$releasever/os", "fedora-14/os/repodata/repomd.xml"));
        assert!(!matches("$releasever/os", "fedora-14/os-extras"));
    }

    #[test]
    fn dollar_not_followed_by_identifier_is_literal() {
        assert!(matches("price$/os", "price$/os"));
        assert!(!matches("price$/os", "price5/os"));
    }

    #[test]
    fn basearch_matches_either_arch_at_the_same_position() {
        assert!(matches("repos/fedora-14/$basearch/", "repos/fedora-14/x86_64/"));
        assert!(matches("repos/fedora-14/$basearch/", "repos/fedora-14/i386/"));
    }

    #[test]
    fn doubled_slashes_are_normalized_on_both_sides() {
        assert!(matches(
            "/pulp/repos/fedora-14/x86_64/",
            "//pulp//repos/fedora-14/x86_64/"
        ));
    }

    #[test]
    fn matching_is_closed_under_a_trailing_slash() {
        let template = "repos/pulp/pulp/fedora-14/x86_64/";
        let path = "repos/pulp/pulp/fedora-14/x86_64";
        assert!(matches(template, path));
        assert!(matches(template, &format!("{path}/")));
    }

    #[test]
    fn trailing_wildcard_entitlement_does_not_cover_a_different_release() {
        let template = "repos/pulp/pulp/$releasever/$basearch/os";
        assert!(matches(
            template,
            "repos/pulp/pulp/fedora-14/x86_64/os/repodata/repomd.xml"
        ));
        assert!(!matches(
            template,
            "repos/pulp/pulp/fedora-13/x86_64/mrg-g/2.0/os"
        ));
    }

    #[test]
    fn matches_any_short_circuits_on_first_hit() {
        let templates = vec!["repos/a/", "repos/b/"];
        assert!(matches_any(templates.iter().copied(), "repos/b/x"));
        assert!(!matches_any(templates.iter().copied(), "repos/c/x"));
    }
}
