//! Test harness for the smart vaults contracts: mocks of the external
//! collaborators, `cw-multi-test` wrappers and a deployment helper that wires
//! a complete environment from a JSON description.

pub mod contracts;
pub mod deploy;
pub mod mocks;

pub use deploy::{deploy, Deployment, DeployInput};
