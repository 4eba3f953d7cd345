//! Built-in section manifest.

use crate::config::SectionConfig;

fn section(name: &str, paths: &[&str], enable_logged_out: bool) -> SectionConfig {
    SectionConfig {
        name: name.to_string(),
        paths: paths.iter().map(|p| p.to_string()).collect(),
        module: name.to_string(),
        isomorphic: false,
        enable_logged_out,
        env_ids: None,
    }
}

/// Sections used when the configuration does not declare any.
pub fn default_sections() -> Vec<SectionConfig> {
    vec![
        section("sites", &["/sites"], false),
        section("customize", &["/customize"], false),
        section("posts", &["/posts"], false),
        section("pages", &["/pages"], false),
        section("sharing", &["/sharing"], false),
        section("upgrades", &["/upgrade", "/checkout"], false),
        section("plans", &["/plans"], false),
        section("stats", &["/stats"], false),
        section("me", &["/me"], false),
        section("store", &["/store"], false),
        section("login", &["/log-in"], true),
        section("signup", &["/start"], true),
        SectionConfig {
            isomorphic: true,
            ..section("themes", &["/design", "/themes"], true)
        },
        section("reader", &["/", "/read", "/discover", "/tag", "/following"], false),
    ]
}
