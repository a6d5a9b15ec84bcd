// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Storefront

// Port Configuration
pub const STOREFRONT_API_PORT: &str = "STOREFRONT_API_PORT";
pub const PORT: &str = "PORT"; // Legacy

// Database
pub const STOREFRONT_DATABASE_PATH: &str = "STOREFRONT_DATABASE_PATH";

// CORS Configuration
pub const CORS_ORIGIN: &str = "CORS_ORIGIN";

// Pricing
pub const STOREFRONT_SHIPPING_FEE: &str = "STOREFRONT_SHIPPING_FEE";
pub const STOREFRONT_FREE_SHIPPING_THRESHOLD: &str = "STOREFRONT_FREE_SHIPPING_THRESHOLD";
pub const STOREFRONT_TOTAL_TOLERANCE: &str = "STOREFRONT_TOTAL_TOLERANCE";

// Order submission
pub const STOREFRONT_SUBMIT_TIMEOUT_SECS: &str = "STOREFRONT_SUBMIT_TIMEOUT_SECS";
pub const STOREFRONT_RESTOCK_ON_CANCEL: &str = "STOREFRONT_RESTOCK_ON_CANCEL";

// Checkout client
pub const STOREFRONT_HTTP_REQUEST_TIMEOUT_SECS: &str = "STOREFRONT_HTTP_REQUEST_TIMEOUT_SECS";

/// Default API port when neither port variable is set
pub const DEFAULT_API_PORT: u16 = 4001;

/// Default CORS origin for the storefront UI
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Default server-side bound on a single order submission
pub const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 10;
