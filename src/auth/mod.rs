pub mod flow;
pub mod identity;
pub mod memory;

pub use flow::{AuthCopy, AuthFlow, AuthStage};
pub use identity::{AuthSession, IdentityService};
pub use memory::InMemoryIdentity;
