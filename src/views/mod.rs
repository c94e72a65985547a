pub mod confirm;
pub mod form;
pub mod list;
pub mod references;

pub use confirm::Confirm;
pub use form::{FormState, FormView, Mode};
pub use list::ListView;
pub use references::{Reference, References, load_references};
