#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end tests for the Site Counts block.
//!
//! Boots a kernel, lets the plugin register on `init`, and renders
//! through the block registry against an in-memory site.

use std::sync::Arc;
use std::time::Duration;

use site_counts::{BLOCK_NAME, POST_COUNTS_KEY, SITE_COUNTS_KEY, SiteCountsBlock};
use site_counts_kernel::locale::{PoCatalog, parse_po};
use site_counts_kernel::{Config, Kernel};
use site_counts_sdk::prelude::*;
use site_counts_test_utils::{FakeSite, TestItem, assert, test_item};

struct TestApp {
    kernel: Kernel,
    site: Arc<FakeSite>,
}

impl TestApp {
    fn new(site: FakeSite) -> Self {
        Self::with_catalog(site, Arc::new(IdentityCatalog))
    }

    fn with_catalog(site: FakeSite, catalog: Arc<dyn Catalog>) -> Self {
        site_counts_kernel::logging::init_tracing();

        let site = Arc::new(site);
        let mut kernel = Kernel::with_catalog(Config::default(), catalog);
        let services = HostServices {
            transients: kernel.transient_store(),
            content_types: Arc::clone(&site) as Arc<dyn ContentTypeSource>,
            items: Arc::clone(&site) as Arc<dyn ItemQueryService>,
            catalog: kernel.catalog(),
        };

        let block = Arc::new(SiteCountsBlock::bundled(services));
        block.init(kernel.hooks_mut());
        kernel.boot().expect("boot failed");

        Self { kernel, site }
    }

    fn render(&self, class_name: Option<&str>, current_id: Option<u64>) -> String {
        let attributes = match class_name {
            Some(class) => BlockAttributes::new().with("className", class),
            None => BlockAttributes::new(),
        };
        let context = RenderContext {
            current_item_id: current_id,
        };
        self.kernel
            .render_block(BLOCK_NAME, &attributes, &context)
            .expect("render failed")
    }
}

/// A published item carrying both terms the listing filters on.
fn listed(id: u64, item_type: &str, title: &str) -> TestItem {
    test_item(id, item_type, title).tagged("foo").in_category("baz")
}

/// post:5, page:2, attachment:0 and nothing matching the filter.
fn example_site() -> FakeSite {
    FakeSite::new()
        .with_public_types(&["post", "page", "attachment"])
        .with_content_type("revision", false)
        .with_items_of_type("post", 1, 5)
        .with_items_of_type("page", 100, 2)
        .with_items_of_type("revision", 200, 3)
}

#[test]
fn init_registers_block_from_manifest() {
    let app = TestApp::new(example_site());
    let block = app.kernel.blocks().get(BLOCK_NAME).expect("block registered");
    assert_eq!(block.metadata.title, "Site Counts");
    assert_eq!(block.metadata.text_domain.as_deref(), Some("site-counts"));
    assert!(block.metadata.attributes.contains_key("className"));
}

#[test]
fn counts_example_without_filtered_items() {
    let app = TestApp::new(example_site());
    let html = app.render(Some("my-block"), Some(42));

    assert::contains(&html, "class=\"my-block\"");
    assert::contains(&html, "<h2>Post Counts</h2>");
    assert::contains(&html, "<li>There are 5 post.</li>");
    assert::contains(&html, "<li>There are 2 page.</li>");
    assert::contains(&html, "<li>There are 0 attachment.</li>");
    assert::not_contains(&html, "revision");
    assert::contains(&html, "<p>The current post ID is 42.</p>");
    assert::occurrences(&html, "<h2>", 1);
    assert::occurrences(&html, "<ul>", 1);
}

#[test]
fn full_markup_is_well_formed() {
    let site = FakeSite::new()
        .with_public_types(&["post"])
        .with_item(listed(7, "post", "Hello"));
    let app = TestApp::new(site);

    assert_eq!(
        app.render(Some("my-block"), Some(7)),
        "<div class=\"my-block\"><h2>Post Counts</h2>\
         <ul><li>There are 1 post.</li></ul>\
         <p>The current post ID is 7.</p>\
         <h2>1 post with the tag of foo and the category of baz</h2>\
         <ul><li>Hello</li></ul></div>"
    );
}

#[test]
fn filtered_listing_pluralizes() {
    let site = FakeSite::new()
        .with_public_types(&["post", "page"])
        .with_item(listed(1, "post", "Morning").created_at_hour(9))
        .with_item(listed(2, "page", "Draft page").draft().created_at_hour(17));
    let app = TestApp::new(site);
    let html = app.render(None, None);

    assert::contains(&html, "<h2>2 posts with the tag of foo and the category of baz</h2>");
    assert::contains(&html, "<li>Morning</li>");
    assert::contains(&html, "<li>Draft page</li>");
}

#[test]
fn filtered_listing_applies_every_condition() {
    let site = FakeSite::new()
        .with_public_types(&["post", "page", "attachment"])
        .with_item(listed(1, "post", "Kept"))
        .with_item(listed(2, "post", "Too early").created_at_hour(8))
        .with_item(listed(3, "post", "Too late").created_at_hour(18))
        .with_item(
            test_item(4, "post", "Wrong tag")
                .tagged("bar")
                .in_category("baz"),
        )
        .with_item(
            test_item(5, "post", "Category slug only")
                .tagged("foo")
                .with_term("category", "baz", "Bazaar"),
        )
        .with_item(listed(6, "attachment", "Wrong type"));
    let app = TestApp::new(site);
    let html = app.render(None, Some(1));

    assert::contains(&html, "<h2>1 post with the tag of foo and the category of baz</h2>");
    assert::contains(&html, "<li>Kept</li>");
    for excluded in ["Too early", "Too late", "Wrong tag", "Category slug only", "Wrong type"] {
        assert::not_contains(&html, excluded);
    }
}

#[test]
fn current_item_is_not_excluded_from_listing() {
    let site = FakeSite::new()
        .with_public_types(&["post"])
        .with_item(listed(42, "post", "Self"));
    let app = TestApp::new(site);
    let html = app.render(None, Some(42));

    assert::contains(&html, "<li>Self</li>");
}

#[test]
fn missing_class_name_renders_empty_class() {
    let app = TestApp::new(example_site());
    let html = app.render(None, None);

    assert!(html.starts_with("<div class=\"\">"), "got: {html}");
    assert::contains(&html, "<p>The current post ID is 0.</p>");
}

#[test]
fn interpolated_text_is_escaped() {
    let site = FakeSite::new()
        .with_public_types(&["post"])
        .with_item(
            test_item(1, "post", "<script>alert(1)</script> & co")
                .tagged("foo")
                .in_category("baz"),
        );
    let app = TestApp::new(site);
    let html = app.render(Some("x\" onclick=\"evil()"), None);

    assert::contains(&html, "class=\"x&quot; onclick=&quot;evil()\"");
    assert::contains(&html, "<li>&lt;script&gt;alert(1)&lt;/script&gt; &amp; co</li>");
    assert::not_contains(&html, "<script>");
}

#[test]
fn second_render_reuses_transients() {
    let app = TestApp::new(example_site());
    let first = app.render(Some("my-block"), Some(42));
    assert_eq!(app.site.type_calls(), 1);
    assert_eq!(app.site.count_calls(), 3);
    assert_eq!(app.site.query_calls(), 1);

    // New content does not show up until the transients expire
    app.site.add_item(test_item(9, "post", "Late arrival"));
    let second = app.render(Some("my-block"), Some(42));

    assert_eq!(first, second);
    assert_eq!(app.site.type_calls(), 1);
    assert_eq!(app.site.count_calls(), 3);
    assert_eq!(app.site.query_calls(), 1);
}

#[test]
fn current_id_does_not_come_from_cache() {
    let app = TestApp::new(example_site());
    let first = app.render(None, Some(1));
    let second = app.render(None, Some(2));

    assert::contains(&first, "The current post ID is 1.");
    assert::contains(&second, "The current post ID is 2.");
    assert_eq!(app.site.type_calls(), 1);
}

#[test]
fn transients_are_written_on_miss() {
    let app = TestApp::new(example_site());
    assert!(app.kernel.transients().get(SITE_COUNTS_KEY).unwrap().is_none());
    assert!(app.kernel.transients().get(POST_COUNTS_KEY).unwrap().is_none());

    app.render(None, None);

    let counts: Vec<ContentTypeCount> =
        serde_json::from_str(&app.kernel.transients().get(SITE_COUNTS_KEY).unwrap().unwrap())
            .unwrap();
    assert_eq!(counts.len(), 3);
    let result: QueryResult =
        serde_json::from_str(&app.kernel.transients().get(POST_COUNTS_KEY).unwrap().unwrap())
            .unwrap();
    assert_eq!(result.found, 0);
}

#[test]
fn expired_transients_are_rebuilt() {
    let app = TestApp::new(example_site());
    app.render(None, None);

    app.kernel.transients().delete(SITE_COUNTS_KEY).unwrap();
    app.site.add_item(test_item(9, "post", "Late arrival"));
    let html = app.render(None, None);

    assert::contains(&html, "<li>There are 6 post.</li>");
    assert_eq!(app.site.type_calls(), 2);
    // The other slot was still fresh
    assert_eq!(app.site.query_calls(), 1);
}

#[test]
fn transient_ttl_expiry_triggers_rebuild() {
    let app = TestApp::new(example_site());
    // Overwrite the slot with a short-lived value to stand in for a day passing
    app.kernel
        .transients()
        .set(SITE_COUNTS_KEY, "[]", Duration::from_millis(50))
        .unwrap();
    std::thread::sleep(Duration::from_millis(200));

    let html = app.render(None, None);
    assert::contains(&html, "<li>There are 5 post.</li>");
    assert_eq!(app.site.type_calls(), 1);
}

#[test]
fn query_failure_propagates() {
    let app = TestApp::new(example_site());
    app.site.fail_queries(true);

    let err = app
        .kernel
        .render_block(BLOCK_NAME, &BlockAttributes::new(), &RenderContext::default())
        .unwrap_err();
    assert!(matches!(err, HostError::Query(_)));
}

#[test]
fn translated_strings_and_plural_forms() {
    let po = r#"
msgid "Post Counts"
msgstr "Nombre d'articles"

msgid "There are %1$d %2$s."
msgstr "%2$s : %1$d."

msgid "The current post ID is %1$d."
msgstr "L'article courant est %1$d."

msgid "post"
msgid_plural "posts"
msgstr[0] "article"
msgstr[1] "articles"

msgid "%1$d %2$s with the tag of %3$s and the category of %4$s"
msgstr "%1$d %2$s avec l'étiquette %3$s et la catégorie %4$s"
"#;
    let mut catalog = PoCatalog::new();
    catalog.add_entries("site-counts", parse_po(po));

    let site = FakeSite::new()
        .with_public_types(&["post"])
        .with_item(listed(1, "post", "Bonjour"));
    let app = TestApp::with_catalog(site, Arc::new(catalog));
    let html = app.render(None, Some(3));

    assert::contains(&html, "<h2>Nombre d&#x27;articles</h2>");
    assert::contains(&html, "<li>post : 1.</li>");
    assert::contains(&html, "<p>L&#x27;article courant est 3.</p>");
    assert::contains(&html, "<h2>1 article avec l&#x27;étiquette foo et la catégorie baz</h2>");
}

#[test]
fn init_twice_overwrites_registration() {
    let site = Arc::new(example_site());
    let mut kernel = Kernel::new(Config::default()).unwrap();
    let services = HostServices {
        transients: kernel.transient_store(),
        content_types: Arc::clone(&site) as Arc<dyn ContentTypeSource>,
        items: Arc::clone(&site) as Arc<dyn ItemQueryService>,
        catalog: kernel.catalog(),
    };
    let block = Arc::new(SiteCountsBlock::bundled(services));
    block.init(kernel.hooks_mut());
    block.init(kernel.hooks_mut());
    kernel.boot().unwrap();

    assert_eq!(kernel.blocks().len(), 1);
    assert!(kernel.blocks().contains(BLOCK_NAME));
}

#[test]
fn missing_manifest_fails_boot() {
    let site = Arc::new(FakeSite::new());
    let mut kernel = Kernel::new(Config::default()).unwrap();
    let services = HostServices {
        transients: kernel.transient_store(),
        content_types: Arc::clone(&site) as Arc<dyn ContentTypeSource>,
        items: site,
        catalog: kernel.catalog(),
    };
    let block = Arc::new(SiteCountsBlock::new("/nonexistent/site_counts", services));
    block.init(kernel.hooks_mut());

    assert!(matches!(kernel.boot(), Err(HostError::Manifest(_))));
    assert!(!kernel.blocks().contains(BLOCK_NAME));
}

#[test]
fn block_dir_resolved_from_plugins_root() {
    let plugins_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf();
    let config = Config::from_lookup(|key| match key {
        "PLUGINS_DIR" => Some(plugins_root.display().to_string()),
        _ => None,
    })
    .unwrap();

    let site = Arc::new(example_site());
    let mut kernel = Kernel::new(config).unwrap();
    let services = HostServices {
        transients: kernel.transient_store(),
        content_types: Arc::clone(&site) as Arc<dyn ContentTypeSource>,
        items: site,
        catalog: kernel.catalog(),
    };
    let block = Arc::new(SiteCountsBlock::new(kernel.plugin_dir("site_counts"), services));
    block.init(kernel.hooks_mut());
    kernel.boot().unwrap();

    let html = kernel
        .render_block(BLOCK_NAME, &BlockAttributes::new(), &RenderContext::for_item(5))
        .unwrap();
    assert::contains(&html, "<p>The current post ID is 5.</p>");
}
