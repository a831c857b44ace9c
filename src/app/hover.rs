use eframe::egui::Pos2;

use super::MapEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum MarkerStyle {
    Normal,
    Highlighted,
}

/// Turns per-frame hit-test results into enter/leave/move events.
#[derive(Debug, Default)]
pub(super) struct HoverTracker {
    marker: Option<usize>,
    country: Option<usize>,
    pointer: Option<Pos2>,
}

impl HoverTracker {
    pub(super) fn hovered_marker(&self) -> Option<usize> {
        self.marker
    }

    pub(super) fn update(
        &mut self,
        marker: Option<usize>,
        country: Option<usize>,
        pointer: Option<Pos2>,
    ) -> Vec<MapEvent> {
        let mut events = Vec::new();

        if self.marker != marker {
            if let Some(previous) = self.marker {
                events.push(MapEvent::MarkerLeft(previous));
            }
            if let Some(next) = marker {
                events.push(MapEvent::MarkerEntered(next));
            }
            self.marker = marker;
        }

        if self.country != country {
            if let Some(previous) = self.country {
                events.push(MapEvent::CountryLeft(previous));
            }
            if let Some(next) = country {
                events.push(MapEvent::CountryEntered(next));
            }
            self.country = country;
        }

        if let Some(position) = pointer
            && self.pointer != pointer
        {
            events.push(MapEvent::PointerMoved(position));
        }
        self.pointer = pointer;

        events
    }
}

/// Marker draw order and styles. Raising a marker moves it to the top of the
/// draw order; restoring puts it back in the slot it came from.
#[derive(Debug)]
pub(super) struct MarkerLayer {
    order: Vec<usize>,
    styles: Vec<MarkerStyle>,
    raised: Option<(usize, usize)>,
}

impl MarkerLayer {
    pub(super) fn new(count: usize) -> Self {
        Self {
            order: (0..count).collect(),
            styles: vec![MarkerStyle::Normal; count],
            raised: None,
        }
    }

    pub(super) fn draw_order(&self) -> &[usize] {
        &self.order
    }

    pub(super) fn style(&self, marker: usize) -> MarkerStyle {
        self.styles
            .get(marker)
            .copied()
            .unwrap_or(MarkerStyle::Normal)
    }

    pub(super) fn raise(&mut self, marker: usize) {
        if marker >= self.styles.len() {
            return;
        }

        if let Some((raised, _)) = self.raised {
            if raised == marker {
                return;
            }
            self.restore(raised);
        }

        let Some(slot) = self.order.iter().position(|&entry| entry == marker) else {
            return;
        };
        self.order.remove(slot);
        self.order.push(marker);
        self.styles[marker] = MarkerStyle::Highlighted;
        self.raised = Some((marker, slot));
    }

    pub(super) fn restore(&mut self, marker: usize) {
        let Some((raised, slot)) = self.raised else {
            return;
        };
        if raised != marker {
            return;
        }

        if let Some(position) = self.order.iter().rposition(|&entry| entry == marker) {
            self.order.remove(position);
            self.order.insert(slot.min(self.order.len()), marker);
        }
        self.styles[marker] = MarkerStyle::Normal;
        self.raised = None;
    }
}
