// Outbound clients for external services.

pub mod inference;
