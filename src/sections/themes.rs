//! Theme showcase sub-router.

use serde_json::json;

use crate::sections::isomorphic::{IsomorphicSection, SectionRouter};

/// Serves `/design` and `/themes`, optionally filtered by tier.
pub struct ThemesSection;

impl IsomorphicSection for ThemesSection {
    fn register(&self, router: &mut SectionRouter) {
        for base in ["/design", "/themes"] {
            router.route(base, |context, _| {
                context.store.set("themes", json!({ "filter": "all" }));
            });
            router.route(&format!("{}/:filter", base), |context, params| {
                let filter = params.get("filter").unwrap_or("all");
                context.store.set("themes", json!({ "filter": filter }));
            });
        }
    }
}
