// ABOUTME: In-crate test suites for the storefront binary library
// ABOUTME: Configuration parsing, application wiring and catalog seeding
