//! Reconciliation engine for declared Crank resources.
//!
//! The engine converges declared (desired) state onto observed remote state
//! one resource at a time. Each cycle is: fetch, plan, execute, re-read.
//! Execution is at-least-once with no rollback; a failed cycle reports what
//! it had already applied and the next cycle re-diffs against the partially
//! updated remote state.
//!
//! Layout:
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | `plan`       | Pure desired/observed diffing and operation ordering   |
//! | `command`    | Command cycle, including relationship edges            |
//! | `repository` | Repository cycle                                       |
//! | `setting`    | Command-setting cycle with immutable-field checks      |
//! | `token`      | Write-only VCS-token upsert                            |
//! | `identity`   | Process-unique local identity tokens                   |
//! | `error`      | Per-cycle failure reporting                            |
//!
//! The reconcilers are generic over the port traits in `crank-domain`; bind
//! them to the HTTP clients from `crank-client` in production, or to
//! in-memory fakes in tests.

mod command;
mod error;
mod identity;
mod plan;
mod repository;
mod setting;
mod token;

pub use command::CommandReconciler;
pub use error::ReconcileError;
pub use identity::IdentityAllocator;
pub use plan::{CommandPlan, Operation, RelationshipDelta, RepositoryPlan, SettingPlan};
pub use repository::RepositoryReconciler;
pub use setting::SettingReconciler;
pub use token::VcsTokenReconciler;
