use crate::markup::{self, attr_td, center_td, field, Markup, CENTER_CLASS};
use crate::response::ResourceRecord;

/// name | details | owner | runtime env count | public name | nodes | cpus |
/// memory | disk | architecture
pub(super) fn render_row(res: &ResourceRecord) -> Markup {
    let res_type = if res.sandbox.is_truthy() {
        "sandbox"
    } else {
        "real"
    };
    let name_hint = markup::hint(
        &format!(r#"class="{res_type}res""#),
        &format!("{res_type} resource"),
        '"',
    );
    let rte_hint = markup::hint(CENTER_CLASS, &res.runtime_environments.to_string(), '"');
    let rte_count = Markup::text(res.runtime_environments.len().to_string());

    markup::row(&[
        attr_td(&field(&res.name), &name_hint),
        center_td(&markup::optional_link(res.resdetailslink.as_ref())),
        center_td(&markup::optional_link(res.resownerlink.as_ref())),
        attr_td(&rte_count, &rte_hint),
        center_td(&field(&res.public_name)),
        center_td(&field(&res.node_count)),
        center_td(&field(&res.cpu_count)),
        center_td(&field(&res.memory)),
        center_td(&field(&res.disk)),
        center_td(&field(&res.architecture)),
    ])
}
