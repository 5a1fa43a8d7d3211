use crate::error::{Result, SmartypeError};
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::fmt;

/// A regex with a left and a right boundary capture around the text it
/// replaces. Keeps its source and flags so it can be rebuilt elsewhere.
#[derive(Clone)]
pub struct BoundaryPattern {
    source: String,
    flags: String,
    regex: Regex,
}

/// A successful match of a `BoundaryPattern`, with byte offsets into the
/// searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryMatch<'t> {
    pub start: usize,
    pub end: usize,
    pub matched: &'t str,
    pub left: &'t str,
    pub right: &'t str,
}

impl BoundaryPattern {
    /// Build a pattern from its source and flag letters.
    ///
    /// Supported flags: `i`, `m`, `s`, `U`, `x` and `u` (Unicode, always on).
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let flags = flags.into();

        let mut builder = RegexBuilder::new(&source);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'U' => builder.swap_greed(true),
                'x' => builder.ignore_whitespace(true),
                'u' => builder.unicode(true),
                other => return Err(SmartypeError::UnsupportedFlag(other)),
            };
        }
        let regex = builder.build()?;

        // group 0 is the whole match
        let groups = regex.captures_len() - 1;
        if groups != 2 {
            return Err(SmartypeError::CaptureGroups {
                pattern: source,
                groups,
            });
        }

        Ok(Self {
            source,
            flags,
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// First match in `text`. A match where either boundary group did not
    /// take part is treated as no match.
    pub fn find<'t>(&self, text: &'t str) -> Option<BoundaryMatch<'t>> {
        let caps = self.regex.captures(text)?;
        let whole = caps.get(0)?;

        match (caps.len(), caps.get(1), caps.get(2)) {
            (3, Some(left), Some(right)) => Some(BoundaryMatch {
                start: whole.start(),
                end: whole.end(),
                matched: whole.as_str(),
                left: left.as_str(),
                right: right.as_str(),
            }),
            (groups, ..) => {
                log::debug!(
                    "Pattern {} matched {:?} without both boundaries ({} groups), ignoring",
                    self.source,
                    whole.as_str(),
                    groups
                );
                None
            }
        }
    }
}

impl fmt::Debug for BoundaryPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryPattern")
            .field("source", &self.source)
            .field("flags", &self.flags)
            .finish()
    }
}

impl PartialEq for BoundaryPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl Eq for BoundaryPattern {}

/// A rule ready for matching: pattern, replacement, and for user rules the
/// trigger text it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    pub matcher: BoundaryPattern,
    pub replacement: String,
    pub trigger: Option<String>,
}

impl CompiledRule {
    pub fn new(matcher: BoundaryPattern, replacement: impl Into<String>, trigger: Option<String>) -> Self {
        Self {
            matcher,
            replacement: replacement.into(),
            trigger,
        }
    }

    /// The replacement wrapped in the boundaries it displaces.
    pub fn expand(&self, found: &BoundaryMatch<'_>) -> String {
        let mut out =
            String::with_capacity(found.left.len() + self.replacement.len() + found.right.len());
        out.push_str(found.left);
        out.push_str(&self.replacement);
        out.push_str(found.right);
        out
    }

    /// Replace the first match in `text`, keeping its boundaries.
    pub fn replace_first<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.matcher.find(text) {
            Some(found) => {
                let mut out = String::with_capacity(text.len() + self.replacement.len());
                out.push_str(&text[..found.start]);
                out.push_str(&self.expand(&found));
                out.push_str(&text[found.end..]);
                Cow::Owned(out)
            }
            None => Cow::Borrowed(text),
        }
    }
}
