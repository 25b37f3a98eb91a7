use crate::markup::{self, base_td, border_td, center_td, field, title_td, Markup};
use crate::response::{ArchiveDetail, ArchiveRecord, Field, FrozenFile};

/// id | view | name | created | file count [| delete]
///
/// Permanent archives cannot be deleted, so that column is left out.
pub(super) fn render_row(arch: &ArchiveRecord, permanent_freeze: bool) -> Markup {
    let view_link = markup::optional_link(arch.viewfreezelink.as_ref());
    let mut cells = vec![
        base_td(&field(&arch.id)),
        center_td(&view_link),
        base_td(&field(&arch.name)),
        base_td(&field(&arch.created)),
        center_td(&field(&arch.frozenfiles)),
    ];
    if !permanent_freeze {
        cells.push(base_td(&markup::optional_link(arch.delfreezelink.as_ref())));
    }
    markup::row(&cells)
}

fn detail_row(label: &str, value: Markup) -> Markup {
    markup::row(&[title_td(&Markup::text(label)), base_td(&value)])
}

fn published(detail: &ArchiveDetail) -> Markup {
    if !detail.publish.is_truthy() {
        return Markup::text("No");
    }
    let mut out = Markup::text("Yes (");
    out.push(&markup::format_url(&detail.publish_url.to_string()));
    out.push(&Markup::text(")"));
    out
}

/// Label/value rows for the archive summary table.
pub(super) fn render_details(detail: &ArchiveDetail) -> Vec<Markup> {
    let mut rows = vec![
        detail_row("ID", field(&detail.id)),
        detail_row("Name", field(&detail.name)),
        markup::row(&[
            title_td(&Markup::text("Description")),
            border_td(&field(&detail.description)),
        ]),
        detail_row("Published", published(detail)),
        detail_row("Creator", field(&detail.creator)),
        detail_row("Created", field(&detail.created)),
    ];
    for (site, value) in detail.locations() {
        rows.push(location_row(&site, &value));
    }
    rows
}

fn location_row(site: &Field, value: &Field) -> Markup {
    markup::row(&[
        title_td(&Markup::text(format!("On {site}"))),
        base_td(&field(value)),
    ])
}

/// name | size | md5sum
pub(super) fn render_file(file: &FrozenFile) -> Markup {
    markup::row(&[
        base_td(&field(&file.name)),
        center_td(&field(&file.size)),
        base_td(&field(&file.md5sum)),
    ])
}
