// ABOUTME: Configuration constants shared across Storefront packages
// ABOUTME: Re-exports the environment variable names read at start-up

pub mod constants;
