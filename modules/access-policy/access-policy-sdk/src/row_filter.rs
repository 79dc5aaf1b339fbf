//! Row filter templates over a closed placeholder vocabulary.
//!
//! A template is a boolean SQL fragment such as `dept_code = @userDept`.
//! It is tokenised once, when the policy is loaded, into literal text and
//! [`Placeholder`] segments. Rendering binds each placeholder to the
//! requesting user's attributes through [`access_security::sql_literal`].
//!
//! The engine does not parse SQL. Any `@` followed by an identifier is a
//! placeholder, wherever it appears; everything else is copied through
//! untouched.

use std::fmt;

use access_security::{UserSecurityContext, sql_literal};
use serde::{Serialize, Serializer};

use crate::error::RuleError;

/// The fixed set of values a row filter may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Placeholder {
    /// `@userId`: quoted user id.
    UserId,
    /// `@userDept`: quoted department code, or `NULL`.
    UserDept,
    /// `@userRegion`: quoted region code, or `NULL`.
    UserRegion,
    /// `@accessibleDepts`: `ARRAY[...]` of accessible department codes.
    AccessibleDepts,
    /// `@accessibleCustomers`: `ARRAY[...]` of accessible customer codes.
    AccessibleCustomers,
}

impl Placeholder {
    pub const ALL: [Self; 5] = [
        Self::UserId,
        Self::UserDept,
        Self::UserRegion,
        Self::AccessibleDepts,
        Self::AccessibleCustomers,
    ];

    /// Token as written in templates, including the leading `@`.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::UserId => "@userId",
            Self::UserDept => "@userDept",
            Self::UserRegion => "@userRegion",
            Self::AccessibleDepts => "@accessibleDepts",
            Self::AccessibleCustomers => "@accessibleCustomers",
        }
    }

    /// Look up a placeholder by its name without the leading `@`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| &p.token()[1..] == name)
    }

    /// SQL text for this placeholder, or `None` when the user lacks the
    /// attribute and the token has to stay unsubstituted.
    ///
    /// Scalar placeholders always bind (absent codes become `NULL`); array
    /// placeholders bind only to a present, non-empty list.
    #[must_use]
    pub fn bind(self, user: &UserSecurityContext) -> Option<String> {
        match self {
            Self::UserId => Some(sql_literal::quote(user.user_id())),
            Self::UserDept => Some(sql_literal::quote_or_null(user.dept_code())),
            Self::UserRegion => Some(sql_literal::quote_or_null(user.region_code())),
            Self::AccessibleDepts => bind_array(user.accessible_depts()),
            Self::AccessibleCustomers => bind_array(user.accessible_customers()),
        }
    }
}

fn bind_array(values: Option<&[String]>) -> Option<String> {
    values
        .filter(|v| !v.is_empty())
        .map(sql_literal::array)
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Placeholder(Placeholder),
}

/// A validated row filter template.
///
/// Equality and merging compare the source text, so two templates that are
/// written identically are the same restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilterTemplate {
    source: String,
    segments: Vec<Segment>,
}

/// Result of binding a template to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRowFilter {
    /// The boolean SQL fragment.
    pub sql: String,
    /// Placeholders left verbatim because the user lacks the attribute.
    /// The fragment is then not valid SQL and the query layer rejects it.
    pub unresolved: Vec<Placeholder>,
}

impl RenderedRowFilter {
    /// `true` when every placeholder was substituted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

impl RowFilterTemplate {
    /// Tokenise and validate a template.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPlaceholder` for an `@name` token outside the vocabulary.
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        let mut segments = Vec::new();
        let mut chars = text.chars().peekable();
        let mut buf = String::new();

        while let Some(c) = chars.next() {
            match c {
                '@' if chars.peek().is_some_and(|&n| is_ident_start(n)) => {
                    let mut name = String::new();
                    while let Some(&n) = chars.peek() {
                        if !is_ident_continue(n) {
                            break;
                        }
                        name.push(n);
                        chars.next();
                    }
                    let placeholder = Placeholder::from_name(&name)
                        .ok_or_else(|| RuleError::UnknownPlaceholder(format!("@{name}")))?;
                    push_text(&mut segments, &std::mem::take(&mut buf));
                    segments.push(Segment::Placeholder(placeholder));
                }
                _ => buf.push(c),
            }
        }
        push_text(&mut segments, &buf);

        Ok(Self {
            source: text.to_owned(),
            segments,
        })
    }

    /// The template text as written in the policy.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Distinct placeholders referenced by the template, in order of first use.
    #[must_use]
    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut seen = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(p) = segment
                && !seen.contains(p)
            {
                seen.push(*p);
            }
        }
        seen
    }

    /// Combine two restrictions permissively.
    ///
    /// Identical templates stay as they are; different ones become
    /// `(A) OR (B)`. A fresh template is always returned.
    #[must_use]
    pub fn or(&self, other: &Self) -> Self {
        if self.source == other.source {
            return self.clone();
        }

        let mut segments = Vec::with_capacity(self.segments.len() + other.segments.len() + 3);
        push_text(&mut segments, "(");
        extend_segments(&mut segments, &self.segments);
        push_text(&mut segments, ") OR (");
        extend_segments(&mut segments, &other.segments);
        push_text(&mut segments, ")");

        Self {
            source: format!("({}) OR ({})", self.source, other.source),
            segments,
        }
    }

    /// Bind every placeholder to `user`'s attributes.
    #[must_use]
    pub fn render(&self, user: &UserSecurityContext) -> RenderedRowFilter {
        let mut sql = String::with_capacity(self.source.len());
        let mut unresolved = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => sql.push_str(text),
                Segment::Placeholder(p) => {
                    if let Some(bound) = p.bind(user) {
                        sql.push_str(&bound);
                    } else {
                        sql.push_str(p.token());
                        if !unresolved.contains(p) {
                            unresolved.push(*p);
                        }
                    }
                }
            }
        }

        RenderedRowFilter { sql, unresolved }
    }
}

impl fmt::Display for RowFilterTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for RowFilterTemplate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_owned()));
    }
}

fn extend_segments(segments: &mut Vec<Segment>, other: &[Segment]) {
    for segment in other {
        match segment {
            Segment::Text(text) => push_text(segments, text),
            Segment::Placeholder(p) => segments.push(Segment::Placeholder(*p)),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn user() -> UserSecurityContext {
        UserSecurityContext::builder()
            .user_id("u1")
            .dept_code("D1")
            .region_code("R2")
            .build()
    }

    #[test]
    fn placeholder_lookup_by_name() {
        for p in Placeholder::ALL {
            assert_eq!(Placeholder::from_name(&p.token()[1..]), Some(p));
        }
        assert_eq!(Placeholder::from_name("userid"), None);
        assert_eq!(Placeholder::from_name(""), None);
    }

    #[test]
    fn parse_collects_placeholders() {
        let t = RowFilterTemplate::parse("dept_code = @userDept AND rep = @userId").unwrap();
        assert_eq!(t.placeholders(), [Placeholder::UserDept, Placeholder::UserId]);
        assert_eq!(t.as_str(), "dept_code = @userDept AND rep = @userId");
    }

    #[test]
    fn parse_rejects_unknown_placeholder() {
        let err = RowFilterTemplate::parse("owner = @userName").unwrap_err();
        assert_eq!(err, RuleError::UnknownPlaceholder("@userName".to_owned()));
    }

    #[test]
    fn parse_rejects_placeholder_prefix_extension() {
        // A longer identifier is a different token, not `@userId` plus text.
        let err = RowFilterTemplate::parse("x = @userIdentity").unwrap_err();
        assert_eq!(err, RuleError::UnknownPlaceholder("@userIdentity".to_owned()));
    }

    #[test]
    fn parse_accepts_any_sql_quoting() {
        for text in [
            r"note <> E'it\'s' AND sales_rep_id = @userId",
            "body = $$it's$$ AND sales_rep_id = @userId",
            "status = 'open AND sales_rep_id = @userId",
        ] {
            let t = RowFilterTemplate::parse(text).unwrap();
            assert_eq!(t.placeholders(), [Placeholder::UserId]);
        }

        let t = RowFilterTemplate::parse("body = $$it's$$ AND sales_rep_id = @userId").unwrap();
        assert_eq!(
            t.render(&user()).sql,
            "body = $$it's$$ AND sales_rep_id = 'u1'"
        );
    }

    #[test]
    fn placeholders_inside_quotes_are_substituted() {
        let t = RowFilterTemplate::parse("label = 'rep:@userId'").unwrap();
        assert_eq!(t.placeholders(), [Placeholder::UserId]);
        assert_eq!(t.render(&user()).sql, "label = 'rep:'u1''");
    }

    #[test]
    fn parse_rejects_unknown_placeholder_inside_quotes() {
        let err = RowFilterTemplate::parse("email LIKE '%@example.com'").unwrap_err();
        assert_eq!(err, RuleError::UnknownPlaceholder("@example".to_owned()));
    }

    #[test]
    fn bare_at_sign_is_text() {
        let t = RowFilterTemplate::parse("tags @> ARRAY['a'] AND @ x").unwrap();
        assert!(t.placeholders().is_empty());
        assert_eq!(t.render(&user()).sql, "tags @> ARRAY['a'] AND @ x");
    }

    #[test]
    fn render_scalars() {
        let t = RowFilterTemplate::parse("dept_code = @userDept OR region_code = @userRegion")
            .unwrap();
        let rendered = t.render(&user());
        assert!(rendered.is_complete());
        assert_eq!(rendered.sql, "dept_code = 'D1' OR region_code = 'R2'");
    }

    #[test]
    fn render_absent_scalar_as_null() {
        let t = RowFilterTemplate::parse("region_code = @userRegion").unwrap();
        let anon = UserSecurityContext::builder().user_id("u1").build();
        let rendered = t.render(&anon);
        assert!(rendered.is_complete());
        assert_eq!(rendered.sql, "region_code = NULL");
    }

    #[test]
    fn render_escapes_quotes() {
        let t = RowFilterTemplate::parse("dept_code = @userDept").unwrap();
        let u = UserSecurityContext::builder().dept_code("O'Brien").build();
        assert_eq!(t.render(&u).sql, "dept_code = 'O''Brien'");
    }

    #[test]
    fn render_array_when_present() {
        let t = RowFilterTemplate::parse("dept_code = ANY(@accessibleDepts)").unwrap();
        let u = UserSecurityContext::builder()
            .accessible_depts(["D1", "D'2"])
            .build();
        let rendered = t.render(&u);
        assert!(rendered.is_complete());
        assert_eq!(rendered.sql, "dept_code = ANY(ARRAY['D1','D''2'])");
    }

    #[test]
    fn render_leaves_missing_array_unsubstituted() {
        let t = RowFilterTemplate::parse(
            "customer_code = ANY(@accessibleCustomers) OR c2 = ANY(@accessibleCustomers)",
        )
        .unwrap();

        let absent = UserSecurityContext::builder().build();
        let rendered = t.render(&absent);
        assert_eq!(rendered.unresolved, [Placeholder::AccessibleCustomers]);
        assert_eq!(rendered.sql, t.as_str());

        let empty = UserSecurityContext::builder()
            .accessible_customers(Vec::<String>::new())
            .build();
        assert!(!t.render(&empty).is_complete());
    }

    #[test]
    fn or_of_identical_templates_is_identity() {
        let a = RowFilterTemplate::parse("dept_code = @userDept").unwrap();
        assert_eq!(a.or(&a.clone()), a);
    }

    #[test]
    fn or_wraps_both_sides() {
        let a = RowFilterTemplate::parse("dept_code = @userDept").unwrap();
        let b = RowFilterTemplate::parse("region_code = @userRegion").unwrap();
        let merged = a.or(&b);

        assert_eq!(
            merged.as_str(),
            "(dept_code = @userDept) OR (region_code = @userRegion)"
        );
        assert_eq!(
            merged,
            RowFilterTemplate::parse("(dept_code = @userDept) OR (region_code = @userRegion)")
                .unwrap()
        );
        assert_eq!(
            merged.render(&user()).sql,
            "(dept_code = 'D1') OR (region_code = 'R2')"
        );
    }

    #[test]
    fn serializes_as_source_text() {
        let t = RowFilterTemplate::parse("sales_rep_id = @userId").unwrap();
        assert_eq!(
            serde_json::to_string(&t).unwrap(),
            r#""sales_rep_id = @userId""#
        );
    }
}
