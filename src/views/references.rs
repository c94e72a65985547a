use tracing::warn;

use crate::api::{CrmApi, endpoints};
use crate::entity::Entity;
use crate::models::{Customer, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Customers,
    Users,
}

/// Read-only collections backing pickers and name lookups.
#[derive(Debug, Clone, Default)]
pub struct References {
    pub customers: Vec<Customer>,
    pub users: Vec<User>,
}

/// Loads the wanted collections concurrently. A failed collection is logged
/// and left empty; it never fails the screen.
pub async fn load_references(api: &dyn CrmApi, wanted: &[Reference]) -> References {
    let (customers, users) = tokio::join!(
        load_one::<Customer>(api, wanted.contains(&Reference::Customers)),
        load_one::<User>(api, wanted.contains(&Reference::Users)),
    );
    References { customers, users }
}

async fn load_one<E: Entity<Scope = ()>>(api: &dyn CrmApi, wanted: bool) -> Vec<E> {
    if !wanted {
        return Vec::new();
    }
    match endpoints::list::<E>(api, &()).await {
        Ok(items) => items,
        Err(e) => {
            warn!("Failed to load {} for lookup: {}", E::RESOURCE, e);
            Vec::new()
        }
    }
}
