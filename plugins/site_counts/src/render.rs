//! Markup for the Site Counts block.

use site_counts_sdk::prelude::*;
use site_counts_sdk::render::{RenderElement, element, markup};

use crate::TEXT_DOMAIN;
use crate::counts::{CATEGORY_NAME, TAG_SLUG, content_type_counts, filtered_items};

/// Render the block.
///
/// Fills either transient on a miss, then emits:
/// a wrapper `div`, the per-type count list, the current item paragraph,
/// and, when the filtered query returned items, their heading and list.
pub(crate) fn render_markup(
    services: &HostServices,
    attributes: &BlockAttributes,
    context: &RenderContext,
) -> Result<String, HostError> {
    let counts = content_type_counts(services)?;
    let filtered = filtered_items(services)?;
    let catalog = services.catalog.as_ref();

    let count_template = catalog.gettext(TEXT_DOMAIN, "There are %1$d %2$s.");
    let count_items = counts.iter().map(|c| {
        let line = sprintf(
            &count_template,
            &[FormatArg::Int(c.count), FormatArg::Str(&c.item_type)],
        );
        markup("li", &line).build()
    });

    let current_id = sprintf(
        &catalog.gettext(TEXT_DOMAIN, "The current post ID is %1$d."),
        &[FormatArg::Int(context.current_item_id.unwrap_or(0))],
    );

    let mut wrapper = element("div")
        .attr("class", attributes.class_name())
        .child(markup("h2", &catalog.gettext(TEXT_DOMAIN, "Post Counts")).build())
        .child(element("ul").children(count_items).build())
        .child(markup("p", &current_id).build());

    if filtered.has_items() {
        wrapper = wrapper
            .child(filtered_heading(catalog, filtered.found))
            .child(
                element("ul")
                    .children(filtered.items.iter().map(|i| markup("li", &i.title).build()))
                    .build(),
            );
    }

    Ok(wrapper.build().to_html())
}

fn filtered_heading(catalog: &dyn Catalog, found: u64) -> RenderElement {
    let noun = catalog.ngettext(TEXT_DOMAIN, "post", "posts", found);
    let template = catalog.gettext(
        TEXT_DOMAIN,
        "%1$d %2$s with the tag of %3$s and the category of %4$s",
    );
    let heading = sprintf(
        &template,
        &[
            FormatArg::Int(found),
            FormatArg::Str(&noun),
            FormatArg::Str(TAG_SLUG),
            FormatArg::Str(CATEGORY_NAME),
        ],
    );
    markup("h2", &heading).build()
}
