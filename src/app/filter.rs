use std::collections::BTreeSet;
use std::iter;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::debug;

use crate::data::NodeRecord;

pub(super) const ALL_ORGANIZATIONS: &str = "All Organizations";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum FilterSelection {
    All,
    One(String),
}

/// Organization dropdown state: the option list derived from the node
/// dataset and the current selection.
pub(super) struct OrganizationFilter {
    options: Vec<String>,
    selection: FilterSelection,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl OrganizationFilter {
    pub(super) fn from_nodes(nodes: &[NodeRecord]) -> Self {
        // An organization literally named like the sentinel is folded into it.
        let names = nodes
            .iter()
            .map(|node| node.organization.as_str())
            .filter(|name| *name != ALL_ORGANIZATIONS)
            .collect::<BTreeSet<_>>();

        let options = iter::once(ALL_ORGANIZATIONS)
            .chain(names)
            .map(str::to_owned)
            .collect();

        Self {
            options,
            selection: FilterSelection::All,
        }
    }

    /// The sentinel first, then every distinct organization in sorted order.
    pub(super) fn options(&self) -> &[String] {
        &self.options
    }

    pub(super) fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub(super) fn selected_value(&self) -> &str {
        match &self.selection {
            FilterSelection::All => ALL_ORGANIZATIONS,
            FilterSelection::One(name) => name,
        }
    }

    /// Applies a dropdown choice. Values that are not options are ignored.
    pub(super) fn select(&mut self, value: &str) -> bool {
        let next = if value == ALL_ORGANIZATIONS {
            FilterSelection::All
        } else if self.options.iter().skip(1).any(|option| option == value) {
            FilterSelection::One(value.to_owned())
        } else {
            debug!(value, "ignoring unknown organization selection");
            return false;
        };

        debug!(selection = ?next, "organization filter changed");
        self.selection = next;
        true
    }

    pub(super) fn is_visible(&self, organization: &str) -> bool {
        match &self.selection {
            FilterSelection::All => true,
            FilterSelection::One(name) => name == organization,
        }
    }

    pub(super) fn visibility(&self, nodes: &[NodeRecord]) -> Vec<bool> {
        nodes
            .iter()
            .map(|node| self.is_visible(&node.organization))
            .collect()
    }

    /// Options whose name fuzzy-matches `query`, in option order. The
    /// sentinel is always kept.
    pub(super) fn matching_options(&self, query: &str) -> Vec<&str> {
        let query = query.trim();
        if query.is_empty() {
            return self.options.iter().map(String::as_str).collect();
        }

        let matcher = SkimMatcherV2::default();
        self.options
            .iter()
            .enumerate()
            .filter(|(index, option)| {
                *index == 0 || fuzzy_match_score(&matcher, option, query).is_some()
            })
            .map(|(_, option)| option.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(organizations: &[&str]) -> Vec<NodeRecord> {
        organizations
            .iter()
            .map(|organization| NodeRecord {
                organization: (*organization).to_owned(),
                ..NodeRecord::default()
            })
            .collect()
    }

    #[test]
    fn options_are_sentinel_then_sorted_unique_names() {
        let filter = OrganizationFilter::from_nodes(&nodes(&[
            "Hetzner Online GmbH",
            "Amazon.com",
            "OVH SAS",
            "Amazon.com",
            "DigitalOcean",
            "Hetzner Online GmbH",
        ]));
        assert_eq!(
            filter.options(),
            [
                ALL_ORGANIZATIONS,
                "Amazon.com",
                "DigitalOcean",
                "Hetzner Online GmbH",
                "OVH SAS"
            ]
        );
    }

    #[test]
    fn sentinel_named_organization_is_not_listed_twice() {
        let filter = OrganizationFilter::from_nodes(&nodes(&["B", ALL_ORGANIZATIONS, "A"]));
        assert_eq!(filter.options(), [ALL_ORGANIZATIONS, "A", "B"]);
    }

    #[test]
    fn starts_with_everything_visible() {
        let records = nodes(&["A", "B", "A"]);
        let filter = OrganizationFilter::from_nodes(&records);
        assert_eq!(filter.selection(), &FilterSelection::All);
        assert_eq!(filter.selected_value(), ALL_ORGANIZATIONS);
        assert_eq!(filter.visibility(&records), [true, true, true]);
    }

    #[test]
    fn selection_transitions_between_all_and_one() {
        let records = nodes(&["A", "B", "A"]);
        let mut filter = OrganizationFilter::from_nodes(&records);

        assert!(filter.select("B"));
        assert_eq!(filter.selection(), &FilterSelection::One("B".to_owned()));
        assert_eq!(filter.visibility(&records), [false, true, false]);

        assert!(filter.select("A"));
        assert_eq!(filter.visibility(&records), [true, false, true]);

        assert!(filter.select(ALL_ORGANIZATIONS));
        assert_eq!(filter.selection(), &FilterSelection::All);
        assert_eq!(filter.visibility(&records), [true, true, true]);
    }

    #[test]
    fn unknown_values_leave_the_selection_alone() {
        let mut filter = OrganizationFilter::from_nodes(&nodes(&["A"]));
        assert!(filter.select("A"));
        assert!(!filter.select("Z"));
        assert_eq!(filter.selected_value(), "A");
    }

    #[test]
    fn narrowing_keeps_the_sentinel_and_option_order() {
        let filter = OrganizationFilter::from_nodes(&nodes(&[
            "Hetzner Online GmbH",
            "Amazon.com",
            "OVH SAS",
        ]));
        assert_eq!(filter.matching_options("  "), filter.options());
        assert_eq!(
            filter.matching_options("hetz"),
            [ALL_ORGANIZATIONS, "Hetzner Online GmbH"]
        );
        assert_eq!(filter.matching_options("qqqq"), [ALL_ORGANIZATIONS]);
    }
}
