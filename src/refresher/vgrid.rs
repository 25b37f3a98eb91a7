use crate::markup::{self, base_td, center_td, field, format_link, Markup};
use crate::response::{LinkDescriptor, VgridRecord};

/// Optional per-vgrid component column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VgridColumn {
    Files,
    Web,
    Scm,
    Tracker,
    Forum,
    Workflows,
    Monitor,
}

impl VgridColumn {
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim() {
            "files" => Some(Self::Files),
            "web" => Some(Self::Web),
            "scm" => Some(Self::Scm),
            "tracker" => Some(Self::Tracker),
            "forum" => Some(Self::Forum),
            "workflows" => Some(Self::Workflows),
            "monitor" => Some(Self::Monitor),
            _ => None,
        }
    }
}

// Every present link followed by a space.
fn spaced_links(links: &[Option<&LinkDescriptor>]) -> Markup {
    let mut out = Markup::default();
    for link in links.iter().flatten() {
        out.push(&format_link(link));
        out.push(&Markup::text(" "));
    }
    out
}

// First present link in priority order.
fn preferred_link(links: &[Option<&LinkDescriptor>]) -> Markup {
    markup::optional_link(links.iter().flatten().next().copied())
}

fn column_links(vgrid: &VgridRecord, column: VgridColumn) -> Markup {
    match column {
        VgridColumn::Files => markup::optional_link(vgrid.sharedfolderlink.as_ref()),
        VgridColumn::Web => spaced_links(&[
            vgrid.enterprivatelink.as_ref(),
            vgrid.editprivatelink.as_ref(),
            vgrid.enterpubliclink.as_ref(),
            vgrid.editpubliclink.as_ref(),
        ]),
        VgridColumn::Scm => spaced_links(&[
            vgrid.ownerscmlink.as_ref(),
            vgrid.memberscmlink.as_ref(),
        ]),
        VgridColumn::Tracker => preferred_link(&[
            vgrid.membertrackerlink.as_ref(),
            vgrid.ownertrackerlink.as_ref(),
        ]),
        VgridColumn::Forum => preferred_link(&[
            vgrid.publicforumlink.as_ref(),
            vgrid.privateforumlink.as_ref(),
        ]),
        VgridColumn::Workflows => markup::optional_link(vgrid.privateworkflowslink.as_ref()),
        VgridColumn::Monitor => markup::optional_link(vgrid.privatemonitorlink.as_ref()),
    }
}

/// name | view | admin | member, then one cell per requested column.
///
/// `None` entries are unrecognized keys. They still take a cell so the row
/// lines up with the table header.
pub(super) fn render_row(vgrid: &VgridRecord, columns: &[Option<VgridColumn>]) -> Markup {
    let mut cells = vec![
        base_td(&field(&vgrid.name)),
        center_td(&markup::optional_link(vgrid.viewvgridlink.as_ref())),
        center_td(&markup::optional_link(vgrid.administratelink.as_ref())),
        center_td(&markup::optional_link(vgrid.memberlink.as_ref())),
    ];
    for column in columns {
        let content = column
            .map(|c| column_links(vgrid, c))
            .unwrap_or_default();
        cells.push(center_td(&content));
    }
    markup::row(&cells)
}
