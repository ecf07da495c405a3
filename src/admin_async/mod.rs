mod client;

pub use client::{KeycloakAdminAsyncClient, KeycloakAdminAsyncClientBuilder};
