/// Default access token length in bytes (48 hex characters)
pub const DEFAULT_TOKEN_BYTES: usize = 24;

/// Shortest access token the directory will issue (128 bits)
pub const MIN_TOKEN_BYTES: usize = 16;

/// Longest access token the directory will issue
pub const MAX_TOKEN_BYTES: usize = 128;

/// Random bytes behind a drone id (43 base64url characters)
pub const DRONE_ID_BYTES: usize = 32;

// =============================================================================
// Column Limits
// =============================================================================

pub const MAX_EMAIL_LEN: usize = 150;
pub const MAX_PERSON_NAME_LEN: usize = 150;

pub const MAX_DRONE_NAME_LEN: usize = 150;
pub const MAX_DESCRIPTION_LEN: usize = 200;
pub const MAX_CAM_QUALITY_LEN: usize = 150;
pub const MAX_FLIGHT_TIME_LEN: usize = 100;
pub const MAX_SPEED_LEN: usize = 100;
pub const MAX_DIMENSIONS_LEN: usize = 100;
pub const MAX_WEIGHT_LEN: usize = 50;
pub const MAX_SERIES_LEN: usize = 150;

/// Money columns are NUMERIC(10, 2)
pub const MONEY_PRECISION: u32 = 10;
pub const MONEY_SCALE: u32 = 2;

// =============================================================================
// Error Messages
// =============================================================================

/// Returned for every failed sign-in, whether the email exists or not
pub const ERR_INVALID_CREDENTIALS: &str = "Invalid email or password";

pub const ERR_INVALID_EMAIL: &str = "A valid email address is required";

pub const ERR_EMPTY_PASSWORD: &str = "Password must not be empty";
