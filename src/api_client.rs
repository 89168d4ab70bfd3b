//! HTTP implementations of the service contracts in [`crate::api`].

pub mod glue_client;
