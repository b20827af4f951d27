//! Typed resources and the data cells behind them.
//!
//! A resource facade (for example [`Account`]) is a thin typed view over a
//! shared [`ResourceData`] cell. Facades are cheap to clone and never own
//! state of their own; the [`ResourceFactory`] builds them for the data
//! store.
//!
//! # Example Usage
//!
//! ```rust
//! use idm_client::resource::{Account, Resource, ResourceStatus};
//!
//! let account = Account::instantiate();
//! account.set_email("jane@example.com");
//! account.set_status(ResourceStatus::Enabled);
//!
//! assert!(account.href().is_none());
//! assert!(account.data().is_dirty());
//! ```

pub mod collection;
pub mod context;
pub mod data;
pub mod factory;
pub mod options;
pub mod status;
pub mod types;

pub use collection::CollectionPage;
pub use context::RequestContext;
pub use data::ResourceData;
pub use factory::ResourceFactory;
pub use options::{ExpandTerm, ResponseOptions};
pub use status::ResourceStatus;
pub use types::{Account, Application, Directory, Group, Organization, Tenant};

/// A typed facade over a resource data cell.
pub trait Resource: Clone + Send + Sync + 'static {
    /// Type name; also determines the cache region.
    const TYPE_NAME: &'static str;

    /// Whether identity map entries for this type never expire.
    const STORE_INFINITELY: bool = false;

    /// Wrap an existing cell.
    fn from_data(data: ResourceData) -> Self;

    fn data(&self) -> &ResourceData;

    /// A new local instance with no href.
    fn instantiate() -> Self {
        Self::from_data(ResourceData::new())
    }

    fn href(&self) -> Option<String> {
        self.data().href()
    }
}
