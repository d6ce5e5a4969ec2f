//! Translation catalogs built from gettext .po files.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use site_counts_sdk::i18n::{Catalog, plural_index};

use super::plural::PluralRule;
use super::po_parser::{PoEntry, parse_po};

/// In-memory catalog keyed by text domain, then by source string.
///
/// Plural forms follow each domain's `Plural-Forms` header when one was
/// loaded, and the two-form `n != 1` rule otherwise.
#[derive(Debug, Clone, Default)]
pub struct PoCatalog {
    domains: HashMap<String, HashMap<String, PoEntry>>,
    plural_rules: HashMap<String, PluralRule>,
}

impl PoCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add entries to `domain`. Later entries win on duplicate sources.
    ///
    /// Entries with a `msgctxt` are ignored: the catalog only serves
    /// context-free lookups.
    pub fn add_entries(&mut self, domain: &str, entries: Vec<PoEntry>) {
        let table = self.domains.entry(domain.to_string()).or_default();
        for entry in entries.into_iter().filter(|e| e.context.is_empty()) {
            table.insert(entry.source.clone(), entry);
        }
    }

    /// Set the plural rule for `domain`, replacing any earlier one.
    pub fn set_plural_rule(&mut self, domain: &str, rule: PluralRule) {
        self.plural_rules.insert(domain.to_string(), rule);
    }

    /// Parse a .po file into `domain`. Returns the number of entries read.
    ///
    /// A valid `Plural-Forms` header becomes the domain's plural rule; an
    /// unparseable one is logged and the default rule is kept.
    pub fn load_file(&mut self, domain: &str, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read translation file: {}", path.display()))?;
        match PluralRule::from_po(&content) {
            Some(rule) => self.set_plural_rule(domain, rule),
            None if content.contains("Plural-Forms:") => {
                warn!(path = %path.display(), "ignoring unparseable Plural-Forms header");
            }
            None => {}
        }
        let entries = parse_po(&content);
        let count = entries.len();
        self.add_entries(domain, entries);
        Ok(count)
    }

    /// Load every `{domain}-{language}.po` file in `dir`.
    ///
    /// Files for other languages are ignored; unreadable files are logged
    /// and skipped.
    pub fn load_dir(dir: &Path, language: &str) -> Result<Self> {
        let suffix = format!("-{language}.po");
        let mut catalog = Self::new();

        let listing = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read locale directory: {}", dir.display()))?;

        for entry in listing {
            let path = entry
                .with_context(|| format!("failed to list locale directory: {}", dir.display()))?
                .path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(domain) = file_name.strip_suffix(&suffix) else {
                continue;
            };
            if domain.is_empty() {
                continue;
            }

            match catalog.load_file(domain, &path) {
                Ok(count) => {
                    info!(
                        domain = %domain,
                        language = %language,
                        entries = count,
                        "translations loaded"
                    );
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping translation file");
                }
            }
        }

        Ok(catalog)
    }

    /// Number of domains with at least one loaded entry.
    pub fn domain_count(&self) -> usize {
        self.domains.values().filter(|t| !t.is_empty()).count()
    }

    fn lookup(&self, domain: &str, source: &str) -> Option<&PoEntry> {
        self.domains.get(domain).and_then(|t| t.get(source))
    }
}

impl Catalog for PoCatalog {
    fn gettext(&self, domain: &str, msgid: &str) -> String {
        self.lookup(domain, msgid)
            .and_then(|e| e.translations.first())
            .filter(|t| !t.is_empty())
            .cloned()
            .unwrap_or_else(|| msgid.to_string())
    }

    fn ngettext(&self, domain: &str, singular: &str, plural: &str, n: u64) -> String {
        let index = self
            .plural_rules
            .get(domain)
            .map_or_else(|| plural_index(n), |rule| rule.index(n));
        self.lookup(domain, singular)
            .filter(|e| e.plural.is_some())
            .and_then(|e| e.translations.get(index))
            .filter(|t| !t.is_empty())
            .cloned()
            // Untranslated: the source strings follow the English rule
            .unwrap_or_else(|| {
                if plural_index(n) == 0 {
                    singular.to_string()
                } else {
                    plural.to_string()
                }
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const FRENCH: &str = r#"
msgid "Post Counts"
msgstr "Nombre d'articles"

msgid "post"
msgid_plural "posts"
msgstr[0] "article"
msgstr[1] "articles"

msgctxt "menu"
msgid "Post Counts"
msgstr "Compteurs"
"#;

    fn french() -> PoCatalog {
        let mut catalog = PoCatalog::new();
        catalog.add_entries("site-counts", parse_po(FRENCH));
        catalog
    }

    #[test]
    fn gettext_translates_known_strings() {
        let catalog = french();
        assert_eq!(catalog.gettext("site-counts", "Post Counts"), "Nombre d'articles");
    }

    #[test]
    fn gettext_falls_back_to_source() {
        let catalog = french();
        assert_eq!(catalog.gettext("site-counts", "Unknown"), "Unknown");
        assert_eq!(catalog.gettext("other-domain", "Post Counts"), "Post Counts");
    }

    #[test]
    fn ngettext_picks_plural_form() {
        let catalog = french();
        assert_eq!(catalog.ngettext("site-counts", "post", "posts", 1), "article");
        assert_eq!(catalog.ngettext("site-counts", "post", "posts", 0), "articles");
        assert_eq!(catalog.ngettext("site-counts", "post", "posts", 7), "articles");
    }

    #[test]
    fn ngettext_follows_loaded_plural_forms_header() {
        let dir =
            std::env::temp_dir().join(format!("site-counts-plural-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("site-counts-fr.po");
        let header = "msgid \"\"\nmsgstr \"\"\n\
                      \"Plural-Forms: nplurals=2; plural=(n > 1);\\n\"\n";
        std::fs::write(&path, format!("{header}{FRENCH}")).unwrap();

        let mut catalog = PoCatalog::new();
        catalog.load_file("site-counts", &path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(catalog.ngettext("site-counts", "post", "posts", 0), "article");
        assert_eq!(catalog.ngettext("site-counts", "post", "posts", 1), "article");
        assert_eq!(catalog.ngettext("site-counts", "post", "posts", 2), "articles");
        // Untranslated strings keep the source language rule
        assert_eq!(catalog.ngettext("site-counts", "page", "pages", 0), "pages");
    }

    #[test]
    fn plural_rule_is_per_domain() {
        let mut catalog = french();
        catalog.add_entries("other", parse_po(FRENCH));
        let rule = PluralRule::parse("nplurals=2; plural=(n > 1);").unwrap();
        catalog.set_plural_rule("other", rule);

        assert_eq!(catalog.ngettext("other", "post", "posts", 0), "article");
        assert_eq!(catalog.ngettext("site-counts", "post", "posts", 0), "articles");
    }

    #[test]
    fn ngettext_falls_back_to_source_forms() {
        let catalog = PoCatalog::new();
        assert_eq!(catalog.ngettext("site-counts", "post", "posts", 1), "post");
        assert_eq!(catalog.ngettext("site-counts", "post", "posts", 2), "posts");
    }

    #[test]
    fn load_dir_filters_by_language() {
        let dir = std::env::temp_dir().join(format!("site-counts-locale-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("site-counts-fr.po"), FRENCH).unwrap();
        std::fs::write(
            dir.join("site-counts-de.po"),
            "msgid \"post\"\nmsgstr \"Beitrag\"\n",
        )
        .unwrap();
        std::fs::write(dir.join("README.txt"), "not a catalog").unwrap();

        let catalog = PoCatalog::load_dir(&dir, "fr").unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(catalog.domain_count(), 1);
        assert_eq!(catalog.gettext("site-counts", "Post Counts"), "Nombre d'articles");
    }

    #[test]
    fn load_dir_missing_directory_errors() {
        let result = PoCatalog::load_dir(Path::new("/nonexistent/languages"), "fr");
        assert!(result.unwrap_err().to_string().contains("locale directory"));
    }
}
