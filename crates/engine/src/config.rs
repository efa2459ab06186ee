//! Session configuration.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `TOWER_COLUMNS` | 8 | grid width |
//! | `TOWER_ROWS` | 14 | grid height |
//! | `TOWER_MATCH_HORIZONTAL` | 3 | horizontal minimum run, 0 disables |
//! | `TOWER_MATCH_VERTICAL` | 3 | vertical minimum run, 0 disables |
//! | `TOWER_MATCH_DIAGONAL` | 0 | diagonal minimum run, 0 disables |
//! | `TOWER_WRAP_MATCH` | false | horizontal runs continue across the side edges |
//! | `TOWER_WRAP_MOVE` | false | placements wrap across the side edges |
//! | `TOWER_SPAWN_TYPES` | 4 | number of concrete types spawned, starting at id 1 |
//! | `TOWER_SEED` | 1 | RNG seed |
//! | `TOWER_BONUS_EVERY` | 8 | placements between bonus push-ups, 0 disables |
//!
//! Unset or blank variables take the default; anything unparsable is an error.

use std::str::FromStr;

use tower_cascade_types::{GridRules, SpawnRange, DEFAULT_COLUMNS, DEFAULT_ROWS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
    ZeroExtent { key: &'static str },
    SpawnTypes { count: u8 },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Invalid { .. } => "invalid_value",
            ConfigError::ZeroExtent { .. } => "zero_extent",
            ConfigError::SpawnTypes { .. } => "invalid_spawn_types",
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => write!(f, "{}: cannot parse {:?}", key, value),
            ConfigError::ZeroExtent { key } => write!(f, "{} must be at least 1", key),
            ConfigError::SpawnTypes { count } => {
                write!(f, "TOWER_SPAWN_TYPES={} leaves no room for the reserved type", count)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub columns: u16,
    pub rows: u16,
    pub rules: GridRules,
    pub spawn: SpawnRange,
    pub seed: u32,
    /// Placements between bonus push-ups; 0 disables them.
    pub bonus_every: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            rules: GridRules::default(),
            spawn: SpawnRange::default(),
            seed: 1,
            bonus_every: 8,
        }
    }
}

fn lookup_parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key).map(|s| s.trim().to_string()) {
        None => Ok(default),
        Some(s) if s.is_empty() => Ok(default),
        Some(s) => s.parse().map_err(|_| ConfigError::Invalid { key, value: s }),
    }
}

fn lookup_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

impl SessionConfig {
    /// Read the configuration from `TOWER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary key source.
    ///
    /// ```
    /// use tower_cascade_engine::SessionConfig;
    ///
    /// let config = SessionConfig::from_lookup(|key| match key {
    ///     "TOWER_COLUMNS" => Some("6".to_string()),
    ///     "TOWER_WRAP_MATCH" => Some("on".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.columns, 6);
    /// assert!(config.rules.wrap_sides_on_match);
    /// assert_eq!(config.rows, 14);
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let d = Self::default();

        let columns = lookup_parsed(&lookup, "TOWER_COLUMNS", d.columns)?;
        if columns == 0 {
            return Err(ConfigError::ZeroExtent { key: "TOWER_COLUMNS" });
        }
        let rows = lookup_parsed(&lookup, "TOWER_ROWS", d.rows)?;
        if rows == 0 {
            return Err(ConfigError::ZeroExtent { key: "TOWER_ROWS" });
        }

        let rules = GridRules {
            match_horizontal: lookup_parsed(&lookup, "TOWER_MATCH_HORIZONTAL", d.rules.match_horizontal)?,
            match_vertical: lookup_parsed(&lookup, "TOWER_MATCH_VERTICAL", d.rules.match_vertical)?,
            match_diagonal: lookup_parsed(&lookup, "TOWER_MATCH_DIAGONAL", d.rules.match_diagonal)?,
            wrap_sides_on_match: lookup_flag(&lookup, "TOWER_WRAP_MATCH", d.rules.wrap_sides_on_match)?,
            wrap_sides_on_move: lookup_flag(&lookup, "TOWER_WRAP_MOVE", d.rules.wrap_sides_on_move)?,
        };

        let count = lookup_parsed(&lookup, "TOWER_SPAWN_TYPES", d.spawn.count())?;
        let spawn = SpawnRange::new(d.spawn.first().id(), count).ok_or(ConfigError::SpawnTypes { count })?;

        Ok(Self {
            columns,
            rows,
            rules,
            spawn,
            seed: lookup_parsed(&lookup, "TOWER_SEED", d.seed)?,
            bonus_every: lookup_parsed(&lookup, "TOWER_BONUS_EVERY", d.bonus_every)?,
        })
    }
}
