//! Centralized default constants for grimoire.
//!
//! Crates reference these instead of defining their own magic numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Fixed page size for the wizard listing.
pub const WIZARD_PAGE_SIZE: i64 = 10;

/// Page index used when the request carries none (or an unusable one).
pub const PAGE_INDEX: i64 = 0;

/// Path the pagination `Link` header points at.
pub const WIZARD_LIST_PATH: &str = "/api/wizards";

// =============================================================================
// VALIDATION
// =============================================================================

/// Minimum wizard content length in characters.
pub const WIZARD_CONTENT_MIN_LEN: usize = 1;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const SERVER_PORT: u16 = 3000;

/// Default database URL.
pub const DATABASE_URL: &str = "postgres://localhost/grimoire";

/// Default tracing filter when `RUST_LOG` is unset.
pub const LOG_FILTER: &str = "grimoire_api=debug,grimoire_db=debug,tower_http=debug";
