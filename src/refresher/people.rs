use crate::markup::{self, base_td, center_td, field, Markup, MISSING_ACTION};
use crate::response::UserRecord;

/// name | details, then one send cell per protocol.
pub(super) fn render_row(user: &UserRecord, protocols: &[String]) -> Markup {
    let mut cells = vec![
        base_td(&field(&user.name)),
        center_td(&markup::optional_link(user.userdetailslink.as_ref())),
    ];
    for proto in protocols {
        let send = match user.send_link(proto) {
            Some(link) => markup::format_link(&link),
            None => Markup::text(MISSING_ACTION),
        };
        cells.push(center_td(&send));
    }
    markup::row(&cells)
}
