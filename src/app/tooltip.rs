use eframe::egui::{Pos2, Vec2, vec2};

use crate::data::NodeRecord;
use crate::util::format_connected_since;

/// Offset from the pointer to the tooltip's top-left corner.
pub(super) const TOOLTIP_OFFSET: Vec2 = vec2(10.0, -30.0);

#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct Tooltip {
    visible: bool,
    lines: Vec<String>,
    pointer: Option<Pos2>,
}

pub(super) fn tooltip_lines(node: &NodeRecord) -> Vec<String> {
    vec![
        format!("ASN: {}", node.asn),
        format!("City: {}", node.city),
        format!("Country: {}", node.country_code),
        format!(
            "Connected Since: {}",
            format_connected_since(&node.connected_since)
        ),
    ]
}

impl Tooltip {
    pub(super) fn show(&mut self, node: &NodeRecord) {
        self.lines = tooltip_lines(node);
        self.visible = true;
    }

    pub(super) fn hide(&mut self) {
        self.visible = false;
        self.lines.clear();
    }

    pub(super) fn move_to(&mut self, pointer: Pos2) {
        self.pointer = Some(pointer);
    }

    pub(super) fn content(&self) -> Option<String> {
        self.visible.then(|| self.lines.join("\n"))
    }

    pub(super) fn position(&self) -> Option<Pos2> {
        if !self.visible {
            return None;
        }
        self.pointer.map(|pointer| pointer + TOOLTIP_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> NodeRecord {
        NodeRecord {
            latitude: Some(52.37),
            longitude: Some(4.89),
            organization: "DigitalOcean".to_owned(),
            city: "Amsterdam".to_owned(),
            country_code: "NL".to_owned(),
            connected_since: "1546000000".to_owned(),
            asn: "AS14061".to_owned(),
        }
    }

    #[test]
    fn hidden_by_default() {
        let tooltip = Tooltip::default();
        assert_eq!(tooltip.content(), None);
        assert_eq!(tooltip.position(), None);
    }

    #[test]
    fn shows_one_line_per_attribute() {
        let mut tooltip = Tooltip::default();
        tooltip.show(&node());
        assert_eq!(
            tooltip.content().as_deref(),
            Some(
                "ASN: AS14061\nCity: Amsterdam\nCountry: NL\n\
                 Connected Since: 1546000000 (2018-12-28 12:26 UTC)"
            )
        );
    }

    #[test]
    fn follows_the_pointer_with_an_offset() {
        let mut tooltip = Tooltip::default();
        tooltip.show(&node());
        tooltip.move_to(Pos2::new(50.0, 80.0));
        assert_eq!(tooltip.position(), Some(Pos2::new(60.0, 50.0)));
        tooltip.move_to(Pos2::new(51.0, 81.0));
        assert_eq!(tooltip.position(), Some(Pos2::new(61.0, 51.0)));
    }

    #[test]
    fn hide_clears_content_and_position() {
        let mut tooltip = Tooltip::default();
        tooltip.show(&node());
        tooltip.move_to(Pos2::new(50.0, 80.0));
        tooltip.hide();
        assert_eq!(tooltip.content(), None);
        assert_eq!(tooltip.position(), None);
    }
}
