//! Client-side orchestration for the Upbreed admin screens.
//!
//! - [`cache`]: keyed server-data cache with invalidation-driven refetch.
//! - [`mutation`]: write orchestrator: pending state, toasts, cookie,
//!   invalidation and callbacks around one endpoint call.
//! - [`list`]: debounced search plus pagination folded into one list view.
//! - [`dialog`]: delete/deactivate confirmation and the discard prompt.
//! - [`edit`]: baseline/draft edit forms that PATCH only changed fields.
//! - [`query_state`]: typed screen state mirrored in the URL query.
//! - [`navigation`]: the current route.

pub mod cache;
pub mod debounce;
pub mod dialog;
pub mod edit;
pub mod error;
pub mod list;
pub mod mutation;
pub mod navigation;
pub mod query_state;
pub mod state;

pub use cache::{fetcher, Fetcher, QueryCache, QueryObserver, QueryStatus};
pub use debounce::Debounced;
pub use dialog::{ConfirmOutcome, DeleteCopy, DeleteDialog, DialogState, DiscardPrompt};
pub use edit::{Changes, EditSession, SubmitOutcome};
pub use error::FetchError;
pub use list::{ActiveList, ListController, ListOptions, ListSource, ListView};
pub use mutation::{
    MutateOptions, Mutation, MutationConfig, MutationContext, MutationOutcome, MutationState,
};
pub use navigation::Navigator;
pub use query_state::{QueryParam, QueryStateStore, SortOrder};
pub use state::Loadable;
