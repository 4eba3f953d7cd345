//! Startup-time route registration.
//!
//! # Registration Order
//! ```text
//! 1. /                       home redirect (reader off, stats on)
//! 2. /sites/:site/:section   legacy rewriter
//! 3. /discover, /plans       logged-out redirects (not in development)
//! 4. /theme                  → /design
//! 5. section routes          manifest order
//! 6. 404                     implicit, when nothing answers
//! ```

use thiserror::Error;

use crate::config::ServerConfig;
use crate::routing::legacy::LEGACY_SITES_PATTERN;
use crate::routing::pattern::{PathPattern, PatternError};
use crate::routing::table::{RouteTable, RouteTarget};
use crate::sections::isomorphic::{resolve_module, SectionRoute, SectionRouter};

/// A registered section.
#[derive(Debug, Clone)]
pub struct SectionEntry {
    pub name: String,
    pub enable_logged_out: bool,
    pub isomorphic: bool,
    /// Sub-routes of an isomorphic section; empty otherwise.
    pub routes: Vec<SectionRoute>,
}

/// The frozen route table and the sections it points into.
#[derive(Debug, Clone)]
pub struct SectionRegistry {
    table: RouteTable,
    sections: Vec<SectionEntry>,
}

impl SectionRegistry {
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn sections(&self) -> &[SectionEntry] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&SectionEntry> {
        self.sections.get(index)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("section '{section}' has an invalid path: {source}")]
    Pattern {
        section: String,
        #[source]
        source: PatternError,
    },

    #[error("isomorphic section '{section}' references unknown module '{module}'")]
    UnknownModule { section: String, module: String },
}

fn pattern_error(section: &str) -> impl FnOnce(PatternError) -> RegistryError + '_ {
    move |source| RegistryError::Pattern {
        section: section.to_string(),
        source,
    }
}

/// Build the route table for a configuration.
pub fn build_registry(config: &ServerConfig) -> Result<SectionRegistry, RegistryError> {
    let mut table = RouteTable::new();
    let builtin = |pattern: &str, exact: bool| {
        let compiled = if exact {
            PathPattern::exact(pattern)
        } else {
            PathPattern::prefix(pattern)
        };
        compiled.map_err(pattern_error("builtin"))
    };

    if !config.is_enabled("reader") && config.is_enabled("stats") {
        table.push(builtin("/", true)?, RouteTarget::HomeRedirect);
    }

    table.push(builtin(LEGACY_SITES_PATTERN, true)?, RouteTarget::LegacySites);

    if !config.is_development() {
        table.push(builtin("/discover", true)?, RouteTarget::DiscoverRedirect);
        table.push(builtin("/plans", true)?, RouteTarget::PlansRedirect);
    }

    table.push(builtin("/theme", true)?, RouteTarget::ThemeRedirect);

    let mut sections = Vec::new();
    for section in config
        .sections
        .iter()
        .filter(|s| s.is_available_in(&config.env_id))
    {
        let index = sections.len();
        let mut entry = SectionEntry {
            name: section.name.clone(),
            enable_logged_out: section.enable_logged_out,
            isomorphic: section.isomorphic,
            routes: Vec::new(),
        };

        if section.isomorphic {
            let module = resolve_module(&section.module).ok_or_else(|| RegistryError::UnknownModule {
                section: section.name.clone(),
                module: section.module.clone(),
            })?;
            let mut router = SectionRouter::new();
            module.register(&mut router);
            entry.routes = router.into_routes().map_err(pattern_error(&section.name))?;

            for (route, sub) in entry.routes.iter().enumerate() {
                table.push(sub.pattern.clone(), RouteTarget::SectionRoute { section: index, route });
            }
        } else {
            for path in &section.paths {
                let pattern = PathPattern::section(path).map_err(pattern_error(&section.name))?;
                table.push(pattern, RouteTarget::Section { section: index });
            }
        }

        tracing::debug!(
            section = %entry.name,
            isomorphic = entry.isomorphic,
            logged_out = entry.enable_logged_out,
            "Section registered"
        );
        sections.push(entry);
    }

    tracing::info!(routes = table.len(), sections = sections.len(), "Route table built");
    Ok(SectionRegistry { table, sections })
}
