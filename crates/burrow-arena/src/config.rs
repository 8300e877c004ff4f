//! Allocator configuration parameters.
//!
//! Each config is validated at construction and immutable afterwards, so an
//! allocator built from one never has to re-check it.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use burrow_core::{ceil_order, Order, WORD};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building a configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A block or class size is not a power of two.
    NotPowerOfTwo {
        /// Name of the offending parameter.
        field: &'static str,
        /// The configured value.
        value: usize,
    },
    /// A block or class size is too small to hold free-list links.
    BelowMinimum {
        /// Name of the offending parameter.
        field: &'static str,
        /// The configured value.
        value: usize,
        /// Smallest accepted value.
        minimum: usize,
    },
    /// The smallest size is larger than the largest size.
    InvertedRange {
        /// The configured minimum.
        min: usize,
        /// The configured maximum.
        max: usize,
    },
    /// A backend name that does not match any registered backend.
    UnknownBackend {
        /// The name that failed to parse.
        name: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPowerOfTwo { field, value } => {
                write!(f, "{field} must be a power of two, got {value}")
            }
            Self::BelowMinimum {
                field,
                value,
                minimum,
            } => {
                write!(f, "{field} must be at least {minimum} bytes, got {value}")
            }
            Self::InvertedRange { min, max } => {
                write!(f, "minimum size {min} exceeds maximum size {max}")
            }
            Self::UnknownBackend { name } => {
                write!(f, "unknown backend '{name}', expected 'segregated' or 'buddy'")
            }
        }
    }
}

impl Error for ConfigError {}

fn checked_order(field: &'static str, value: usize, minimum: usize) -> Result<Order, ConfigError> {
    if !value.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo { field, value });
    }
    if value < minimum {
        return Err(ConfigError::BelowMinimum {
            field,
            value,
            minimum,
        });
    }
    // A power of two always has an exact order.
    ceil_order(value).ok_or(ConfigError::NotPowerOfTwo { field, value })
}

// ── SegregatedConfig ───────────────────────────────────────────────

/// Size-class ladder for the segregated free-list allocator.
///
/// Classes double from `min_class` to `max_class` inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegregatedConfig {
    min_order: Order,
    max_order: Order,
}

impl SegregatedConfig {
    /// Default smallest class in bytes.
    pub const DEFAULT_MIN_CLASS: usize = 16;

    /// Default largest class in bytes.
    pub const DEFAULT_MAX_CLASS: usize = 4096;

    /// Build a ladder from `min_class` to `max_class` bytes.
    ///
    /// # Errors
    ///
    /// Both bounds must be powers of two, `min_class` must hold one
    /// machine word (the free-list link), and `min_class <= max_class`.
    pub fn new(min_class: usize, max_class: usize) -> Result<Self, ConfigError> {
        let min_order = checked_order("min_class", min_class, WORD)?;
        let max_order = checked_order("max_class", max_class, WORD)?;
        if min_order > max_order {
            return Err(ConfigError::InvertedRange {
                min: min_class,
                max: max_class,
            });
        }
        Ok(Self {
            min_order,
            max_order,
        })
    }

    /// Order of the smallest class.
    pub fn min_order(&self) -> Order {
        self.min_order
    }

    /// Order of the largest class.
    pub fn max_order(&self) -> Order {
        self.max_order
    }

    /// Smallest class in bytes.
    pub fn min_class(&self) -> usize {
        1 << self.min_order
    }

    /// Largest class in bytes.
    pub fn max_class(&self) -> usize {
        1 << self.max_order
    }

    /// Number of classes on the ladder.
    pub fn class_count(&self) -> usize {
        (self.max_order - self.min_order) as usize + 1
    }
}

impl Default for SegregatedConfig {
    fn default() -> Self {
        Self {
            min_order: 4,
            max_order: 12,
        }
    }
}

// ── BuddyConfig ────────────────────────────────────────────────────

/// Block-size bounds for the buddy allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuddyConfig {
    min_order: Order,
    max_order: Option<Order>,
}

impl BuddyConfig {
    /// Default smallest block in bytes: room for a doubly linked node.
    pub const DEFAULT_MIN_BLOCK: usize = 2 * WORD;

    /// Build a config whose blocks never split below `min_block` bytes.
    ///
    /// The largest block is whatever the arena holds.
    ///
    /// # Errors
    ///
    /// `min_block` must be a power of two of at least two machine words.
    pub fn new(min_block: usize) -> Result<Self, ConfigError> {
        let min_order = checked_order("min_block", min_block, 2 * WORD)?;
        Ok(Self {
            min_order,
            max_order: None,
        })
    }

    /// Cap the largest block at `max_block` bytes.
    ///
    /// Arenas larger than the cap are carved into several top-level blocks
    /// that never coalesce with each other.
    ///
    /// # Errors
    ///
    /// `max_block` must be a power of two no smaller than `min_block`.
    pub fn with_max_block(self, max_block: usize) -> Result<Self, ConfigError> {
        let max_order = checked_order("max_block", max_block, 2 * WORD)?;
        if max_order < self.min_order {
            return Err(ConfigError::InvertedRange {
                min: self.min_block(),
                max: max_block,
            });
        }
        Ok(Self {
            max_order: Some(max_order),
            ..self
        })
    }

    /// Order of the smallest block.
    pub fn min_order(&self) -> Order {
        self.min_order
    }

    /// Order of the largest block, if capped.
    pub fn max_order(&self) -> Option<Order> {
        self.max_order
    }

    /// Smallest block in bytes.
    pub fn min_block(&self) -> usize {
        1 << self.min_order
    }
}

impl Default for BuddyConfig {
    fn default() -> Self {
        Self {
            min_order: (2 * WORD).trailing_zeros() as Order,
            max_order: None,
        }
    }
}

// ── BackendKind / BackendConfig ────────────────────────────────────

/// The registered allocator backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Power-of-two size classes with per-class recycling.
    Segregated,
    /// Binary splitting and coalescing.
    #[default]
    Buddy,
}

impl BackendKind {
    /// Every registered backend, in declaration order.
    pub const ALL: [BackendKind; 2] = [BackendKind::Segregated, BackendKind::Buddy];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Segregated => "segregated",
            Self::Buddy => "buddy",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownBackend { name: s.to_string() })
    }
}

/// Which backend to build and how to configure each one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackendConfig {
    /// Backend selected by [`Backend::from_config`](crate::Backend::from_config).
    pub kind: BackendKind,
    /// Used when `kind` is [`BackendKind::Segregated`].
    pub segregated: SegregatedConfig,
    /// Used when `kind` is [`BackendKind::Buddy`].
    pub buddy: BuddyConfig,
}

impl BackendConfig {
    /// Default settings for the given backend.
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}
