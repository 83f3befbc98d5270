//! System-wide constants for OpenRaise.

/// Decimal places of one whole unit (native currency and token alike).
pub const UNIT_DECIMALS: u32 = 18;

/// Smallest units per whole unit (10^18).
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Minimum accepted contribution, in smallest units (0.1 whole unit).
pub const MIN_CONTRIBUTION: u128 = UNIT / 10;

/// Lifetime contribution cap for participants not on the whitelist (30 units).
pub const BASE_PARTICIPANT_CAP: u128 = 30 * UNIT;

/// Lifetime contribution cap for whitelisted participants (60 units).
pub const WHITELISTED_PARTICIPANT_CAP: u128 = 60 * UNIT;

/// Maximum number of pricing tiers in a schedule.
pub const MAX_TIERS: usize = 5;

/// Maximum number of owners in a consensus wallet.
pub const MAX_OWNER_COUNT: usize = 50;

/// Total supply minted by a freshly created token ledger (10^9 units).
pub const DEFAULT_TOKEN_SUPPLY: u128 = 1_000_000_000 * UNIT;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenRaise";
