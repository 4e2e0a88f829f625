use std::fmt;

use crate::request::PathParams;

/// A route template such as `/users/{id}/posts`.
///
/// A segment is a capture when the whole segment is `{name}`; any other segment is literal.
/// A path matches when it has the same number of `/`-separated segments, every literal
/// segment is equal and every capture segment is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
}

impl RoutePattern {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = raw
            .split('/')
            .map(|segment| match segment.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
                Some(name) if !name.is_empty() && !name.contains(['{', '}']) => Segment::Capture(name.to_owned()),
                _ => Segment::Literal(segment.to_owned()),
            })
            .collect();

        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Capture names in order of appearance
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Capture(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches `path`, returning the captured parameters.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut parts = path.split('/');
        let mut captures = Vec::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Capture(_) if part.is_empty() => return None,
                Segment::Capture(name) => captures.push((name.clone(), part.to_owned())),
            }
        }

        if parts.next().is_some() {
            return None;
        }

        Some(PathParams::new(captures))
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_patterns() {
        let pattern = RoutePattern::parse("/items/all");

        assert!(pattern.matches("/items/all").is_some_and(|params| params.is_empty()));
        assert!(pattern.matches("/items").is_none());
        assert!(pattern.matches("/items/all/").is_none());
        assert!(pattern.matches("/items/other").is_none());
    }

    #[test]
    fn captures_bind_segments() {
        let pattern = RoutePattern::parse("/users/{user_id}/posts/{post_id}");

        let params = pattern.matches("/users/7/posts/abc").unwrap();

        assert_eq!(params.get("user_id"), Some("7"));
        assert_eq!(params.get("post_id"), Some("abc"));
        assert_eq!(pattern.capture_names().collect::<Vec<_>>(), vec!["user_id", "post_id"]);
    }

    #[test]
    fn captures_must_be_non_empty() {
        let pattern = RoutePattern::parse("/users/{id}");

        assert!(pattern.matches("/users/").is_none());
        assert!(pattern.matches("/users/1/extra").is_none());
    }

    #[test]
    fn partial_braces_are_literal() {
        let pattern = RoutePattern::parse("/files/{name}.txt");

        assert_eq!(pattern.capture_names().count(), 0);
        assert!(pattern.matches("/files/{name}.txt").is_some());
        assert!(pattern.matches("/files/a.txt").is_none());
        assert_eq!(RoutePattern::parse("/x/{}").capture_names().count(), 0);
    }

    #[test]
    fn root_pattern() {
        let pattern = RoutePattern::parse("/");

        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("/a").is_none());
    }
}
