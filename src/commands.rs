//! Operations on source control bindings, each an `impl App` block.
//!
//! Lifecycle operations talk to the service and return state without
//! persisting it:
//!
//! - [`create`]: submit, wait for completion, read back the assigned ID
//! - [`read`]: reconcile state with the service
//! - [`update`]: delete followed by create
//! - [`delete`]: remove the configuration
//! - [`import`]: adopt a binding from its ID
//!
//! The `cmd_*` operations drive them against the state file for the CLI:
//! [`apply`], [`refresh`], [`destroy`], [`show`] and `import`.

pub mod apply;
pub mod create;
pub mod delete;
pub mod destroy;
pub mod import;
pub mod read;
pub mod refresh;
pub mod show;
pub mod update;
