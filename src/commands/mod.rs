// Provisioning command
pub mod bootstrap;
