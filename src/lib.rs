//! Rust wrapper around the Azure Resource Manager REST APIs for resource groups
//! and generic resources.
//!
//! # Examples
//!
//! ```no_run
//! use azure_sdk_resources::{ResourceGroup, ResourceManagementClient};
//!
//! # async fn run() -> Result<(), azure_sdk_resources::ResourceManagementError> {
//! let mut client = ResourceManagementClient::new(
//!     "c1a6d79b-082b-4798-b362-a77e96de50db",
//!     "SUPER_SECRET_KEY",
//!     "bc598e67-03d8-44d5-aa46-8289b9a39a14",
//!     "11111111-1111-1111-1111-111111111111",
//! );
//! let group = client
//!     .create_or_update_resource_group("my-group", &ResourceGroup::new("westus"))
//!     .await?;
//! println!("{:?}", group.id());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod display;
mod environment;
mod error;
mod resource;
mod resource_group;
mod walkthrough;

pub use client::ResourceManagementClient;
pub use config::Settings;
pub use display::{format_item, format_properties, ResourceSummary};
pub use environment::AzureEnvironment;
pub use error::{ErrorDetail, ResourceManagementError};
pub use resource::{key_vault_properties, GenericResource, ResourceId};
pub use resource_group::{ExportTemplateRequest, ResourceGroup, ResourceGroupExportResult};
pub use walkthrough::run_walkthrough;
