//! Legacy `/sites/:site/:section` URL rewriting.
//!
//! Old dashboard URLs put the site before the section. They are rewritten
//! with a declarative table; sections not in the table pass through.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::routing::pattern::PathParams;

/// Pattern the rewriter is mounted on (exact match, trailing slash allowed).
pub const LEGACY_SITES_PATTERN: &str = "/sites/:site/:section";

/// How an allow-listed legacy section is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyRewrite {
    /// `/sites/:site/:section` → `/:section/:site`
    SectionThenSite,
    /// `/sites/:site/:section` → `<target>`
    Fixed(&'static str),
}

/// Allow-listed legacy sections.
pub const LEGACY_SECTIONS: &[(&str, LegacyRewrite)] = &[
    ("posts", LegacyRewrite::SectionThenSite),
    ("pages", LegacyRewrite::SectionThenSite),
    ("sharing", LegacyRewrite::SectionThenSite),
    ("upgrade", LegacyRewrite::SectionThenSite),
    ("checkout", LegacyRewrite::SectionThenSite),
    ("change-theme", LegacyRewrite::Fixed("/themes")),
];

const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Look up the rewrite rule for a legacy section.
pub fn rule_for(section: &str) -> Option<LegacyRewrite> {
    LEGACY_SECTIONS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, rule)| *rule)
}

/// Rewrite a matched legacy URL, or `None` when the section is not allow-listed.
///
/// The original query string, if any, is appended to the rewritten path.
pub fn rewrite(params: &PathParams, query: Option<&str>) -> Option<String> {
    let site = params.get("site")?;
    let section = params.get("section")?;

    let mut target = match rule_for(section)? {
        LegacyRewrite::SectionThenSite => format!(
            "/{}/{}",
            utf8_percent_encode(section, SEGMENT),
            utf8_percent_encode(site, SEGMENT)
        ),
        LegacyRewrite::Fixed(path) => path.to_string(),
    };

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}
