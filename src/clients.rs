//! Clients for the Azure Resource Manager API.
//!
//! - [`arm_curl`]: Curl-based HTTP client for making management API requests
//! - [`web_apps`]: Source control operations of `Microsoft.Web/sites`
//!
//! [`web_apps::WebAppsOps`] is the seam between the lifecycle operations and
//! the service; tests substitute a mock or an in-memory fake.

pub mod arm_curl;
pub mod web_apps;
