//! Core constants for the gatehouse access controller.
//!
//! This module defines the tag format limits, feedback timing, and default
//! intervals used throughout the edge device. Values that came from field
//! deployments (debounce window, replica refresh period, feedback durations)
//! are centralized here so the binary and the tests agree on them.

// ============================================================================
// Tag Format Constraints
// ============================================================================

/// Minimum tag identifier length (characters).
///
/// Tag identifiers shorter than this are rejected as invalid.
///
/// # Value: 3 characters
pub const MIN_TAG_LENGTH: usize = 3;

/// Maximum tag identifier length (characters).
///
/// Tag identifiers longer than this are rejected as invalid.
///
/// # Value: 20 characters
pub const MAX_TAG_LENGTH: usize = 20;

// ============================================================================
// Reader Configuration
// ============================================================================

/// Default debounce window for repeated reads of the same tag (seconds).
///
/// A tag held against the reader produces a burst of identical reads; any
/// repeat of the same tag within this window is discarded before it reaches
/// the decision engine. Without this, a single presentation would walk the
/// visit cycle several steps at once.
///
/// # Value: 3 seconds
pub const DEFAULT_DEBOUNCE_SECS: u64 = 3;

// ============================================================================
// Feedback Timing
// ============================================================================

/// Duration the granted indicator stays lit after an authorized read (seconds).
///
/// # Value: 5 seconds
pub const GRANT_SOLID_SECS: u64 = 5;

/// Duration the denied indicator stays lit after a known-but-unauthorized
/// read (seconds).
///
/// # Value: 5 seconds
pub const DENY_SOLID_SECS: u64 = 5;

/// Number of denied-indicator blinks signalling an unrecognized tag.
///
/// An unrecognized tag is a possible intrusion attempt and must be visually
/// distinguishable from an ordinary denial, so the denied channel blinks
/// instead of holding solid.
///
/// # Value: 10 blinks
pub const INTRUSION_BLINK_COUNT: u8 = 10;

/// Total window within which all intrusion blinks complete (seconds).
///
/// `blink(n)` toggles the output n times spread evenly over this window.
///
/// # Value: 10 seconds
pub const BLINK_WINDOW_SECS: u64 = 10;

// ============================================================================
// Replica Refresh
// ============================================================================

/// Default interval between collaborator replica refreshes (seconds).
///
/// The local replica answers every policy lookup; this interval only bounds
/// its staleness. Refresh failures are silent and leave the previous replica
/// in place.
///
/// # Value: 300 seconds (5 minutes)
pub const DEFAULT_REPLICA_REFRESH_SECS: u64 = 300;

// ============================================================================
// Sync Engine Timing
// ============================================================================

/// Default interval between sync cycles when the server is reachable (seconds).
///
/// # Value: 15 seconds
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 15;

/// Initial backoff delay after a failing sync cycle (milliseconds).
///
/// # Value: 1000ms (1 second)
pub const DEFAULT_SYNC_BACKOFF_BASE_MS: u64 = 1_000;

/// Maximum backoff delay between sync cycles (milliseconds).
///
/// Backoff doubles on each consecutive failing cycle up to this cap; retries
/// continue unbounded while the server is unreachable.
///
/// # Value: 300000ms (5 minutes)
pub const DEFAULT_SYNC_BACKOFF_CAP_MS: u64 = 300_000;

// ============================================================================
// HTTP Configuration
// ============================================================================

/// Default timeout for HTTP requests to the central server (milliseconds).
///
/// Applies to both log delivery and registry refresh. A slow server must not
/// hold a sync cycle open indefinitely.
///
/// # Value: 3000ms (3 seconds)
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 3_000;

/// Default base URL of the central server API.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

// ============================================================================
// Default Display Messages (Portuguese, ASCII only)
// ============================================================================

/// Greeting for a first entry.
///
/// # Value: "Bem-vindo" (Welcome)
pub const MSG_WELCOME: &str = "Bem-vindo";

/// Greeting for a repeat-presence acknowledgment.
///
/// # Value: "Bem-vindo de volta" (Welcome back)
pub const MSG_WELCOME_BACK: &str = "Bem-vindo de volta";

/// Farewell on exit.
///
/// # Value: "Ate logo" (See you soon)
pub const MSG_GOODBYE: &str = "Ate logo";

/// Message for a known collaborator without access.
///
/// # Value: "Acesso negado" (Access denied)
pub const MSG_ACCESS_DENIED: &str = "Acesso negado";

/// Message for an unrecognized tag.
///
/// # Value: "Identificacao nao encontrada" (Identification not found)
pub const MSG_UNKNOWN_TAG: &str = "Identificacao nao encontrada";
