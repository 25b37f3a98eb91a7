use crate::markup::{self, attr_td, base_td, center_td, field, Markup, CENTER_CLASS};
use crate::response::RuntimeEnvRecord;

/// name | view | owner | description | resource count | created
pub(super) fn render_row(rte: &RuntimeEnvRecord) -> Markup {
    let view_link = markup::optional_link(rte.viewruntimeenvlink.as_ref());
    let owner_link = markup::optional_link(rte.ownerlink.as_ref());
    let count_hint = markup::hint(CENTER_CLASS, &rte.providers.to_string(), '\'');
    markup::row(&[
        base_td(&field(&rte.name)),
        center_td(&view_link),
        center_td(&owner_link),
        base_td(&field(&rte.description)),
        attr_td(&field(&rte.resource_count), &count_hint),
        base_td(&field(&rte.created)),
    ])
}
