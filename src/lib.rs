//! Warden-0: perimeter watch controller
//!
//! Watches a detector feed for a person presenting a package, challenges
//! them for a spoken passphrase, receives the delivery or guards the
//! perimeter, and drives voice, a deterrent link, and an incident ledger.

pub mod core;
pub mod types;

// =============================================================================
// DETECTION THRESHOLDS [C]
// =============================================================================

/// Detector confidence while idly scanning for deliveries (favors recall)
pub const CONFIDENCE_SCAN: f32 = 0.15;

/// Detector confidence while guarding (favors precision, avoids re-triggering)
pub const CONFIDENCE_GUARD: f32 = 0.30;

/// Consecutive qualifying frames before a detection counts as confirmed.
/// Exists to suppress single-frame false positives from the detector.
pub const DEBOUNCE_CONFIRM_FRAMES: u32 = 5;

/// A person box taller than this fraction of the frame counts as oversized
pub const OVERSIZE_HEIGHT_RATIO: f32 = 0.50;

// =============================================================================
// TIMING [C]
// =============================================================================

/// Wrong-password guarding self-clears after this many seconds
pub const WRONG_PASSWORD_TIMEOUT_SECS: u64 = 10;

/// Hold after a deterrence episode while the attack sequence runs
pub const DETERRENCE_COOLDOWN_SECS: u64 = 12;

/// Backoff after the intent oracle rejects a confirmed detection
pub const FALSE_ALARM_BACKOFF_SECS: u64 = 10;

/// Hold after a completed delivery before returning to watch
pub const DELIVERY_FAREWELL_HOLD_SECS: u64 = 5;

/// Hold after closing the hatch on silence
pub const HATCH_CLOSE_HOLD_SECS: u64 = 3;

// =============================================================================
// HARDWARE LINK [C]
// =============================================================================

/// Sole outbound command on the actuator link, newline-terminated
pub const ATTACK_COMMAND: &[u8] = b"ATTACK\n";

// =============================================================================
// SPOKEN LINES [C]
// =============================================================================

/// Challenge issued once a sighting is confirmed and verified
pub const LINE_PASSWORD_PROMPT: &str =
    "Delivery detected. Please state the delivery password.";

/// Correct passphrase, hatch opens
pub const LINE_PASSWORD_ACCEPTED: &str =
    "Password accepted. Opening hatch. Please tell me if the package is too big.";

/// Wrong passphrase, guarding begins
pub const LINE_PASSWORD_REJECTED: &str =
    "Incorrect password. I am entering guard mode. Step away.";

/// Package does not fit, guarding it outside
pub const LINE_PACKAGE_TOO_BIG: &str =
    "Understood. Closing hatch. Place the package next to me and I will guard it.";

/// Delivery complete
pub const LINE_DELIVERY_THANKS: &str = "Thank you for the delivery. Have a safe route!";

/// Courier went quiet, closing up
pub const LINE_HATCH_CLOSING: &str = "Hatch closing. Thank you!";

/// Deterrence warnings, one chosen uniformly per episode
pub const WARNING_LINES: [&str; 4] = [
    "WARNING! You are entering a restricted zone!",
    "Step away immediately! I am calling the police!",
    "Intruder detected. You are being recorded.",
    "Leave the premises now or defensive measures will be deployed!",
];

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
