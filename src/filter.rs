use std::collections::HashMap;

use crate::entity::Entity;
use crate::views::References;

/// Display names of referenced records, resolved by id.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    customers: HashMap<i64, String>,
    users: HashMap<i64, String>,
}

impl Lookup {
    pub fn from_references(references: &References) -> Self {
        Self {
            customers: references
                .customers
                .iter()
                .filter_map(|c| c.id.map(|id| (id, c.name.clone())))
                .collect(),
            users: references
                .users
                .iter()
                .filter_map(|u| u.id.map(|id| (id, u.name.clone())))
                .collect(),
        }
    }

    pub fn customer_name(&self, id: i64) -> Option<&str> {
        self.customers.get(&id).map(String::as_str)
    }

    pub fn user_name(&self, id: i64) -> Option<&str> {
        self.users.get(&id).map(String::as_str)
    }
}

/// Case-insensitive substring search over each item's search fields.
///
/// An empty term keeps every item; order is never changed.
pub fn filter_items<'a, E: Entity>(items: &'a [E], term: &str, lookup: &Lookup) -> Vec<&'a E> {
    if term.is_empty() {
        return items.iter().collect();
    }
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| {
            item.search_fields(lookup)
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::{Customer, CustomerStatus, Meeting, MeetingStatus, User};

    fn customer(id: i64, name: &str, email: &str) -> Customer {
        Customer {
            id: Some(id),
            name: name.to_string(),
            email: Some(email.to_string()),
            phone: None,
            note: None,
            status: CustomerStatus::Active,
        }
    }

    fn ids<E: Entity>(items: &[&E]) -> Vec<i64> {
        items.iter().filter_map(|e| e.id()).collect()
    }

    fn sample() -> Vec<Customer> {
        vec![
            customer(1, "Jan Novák", "jan@x.cz"),
            customer(2, "Eva Malá", "eva@x.cz"),
        ]
    }

    #[test]
    fn filters_customers_by_name_and_email() {
        let items = sample();
        let lookup = Lookup::default();

        assert_eq!(ids(&filter_items(&items, "jan", &lookup)), vec![1]);
        assert_eq!(ids(&filter_items(&items, "cz", &lookup)), vec![1, 2]);
        assert!(filter_items(&items, "xyz", &lookup).is_empty());
    }

    #[test]
    fn empty_term_is_identity() {
        let items = sample();
        let all = filter_items(&items, "", &Lookup::default());
        assert_eq!(all.len(), items.len());
        assert!(all.iter().zip(&items).all(|(a, b)| *a == b));
    }

    #[test]
    fn filtering_is_case_insensitive_and_idempotent() {
        let items = sample();
        let lookup = Lookup::default();

        let upper = filter_items(&items, "NOVÁK", &lookup);
        let lower = filter_items(&items, "novák", &lookup);
        assert_eq!(ids(&upper), ids(&lower));

        let once: Vec<Customer> = filter_items(&items, "eva", &lookup).into_iter().cloned().collect();
        let twice = filter_items(&once, "eva", &lookup);
        assert_eq!(ids(&twice), ids(&once.iter().collect::<Vec<_>>()));
    }

    #[test]
    fn meetings_match_resolved_names_and_status_labels() {
        let references = References {
            customers: vec![customer(7, "Jan Novák", "jan@x.cz")],
            users: vec![User {
                id: Some(3),
                name: "Petr Svoboda".to_string(),
                email: "petr@x.cz".to_string(),
                role: Default::default(),
                active: true,
                note: None,
            }],
        };
        let lookup = Lookup::from_references(&references);

        let meeting = Meeting {
            id: Some(1),
            title: "Contract review".to_string(),
            date: None,
            time: None,
            customer_id: Some(7),
            note: None,
            status: MeetingStatus::Cancelled,
            user_ids: BTreeSet::from([3]),
        };
        let items = vec![meeting];

        assert_eq!(filter_items(&items, "novák", &lookup).len(), 1);
        assert_eq!(filter_items(&items, "svoboda", &lookup).len(), 1);
        assert_eq!(filter_items(&items, "cancel", &lookup).len(), 1);
        assert!(filter_items(&items, "planned", &lookup).is_empty());
        // without references the names are unknown
        assert!(filter_items(&items, "novák", &Lookup::default()).is_empty());
    }
}
