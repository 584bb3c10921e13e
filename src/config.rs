//! Mitigation switches and demo configuration.
//!
//! Build-time defaults come from the `no-default-hint` and
//! `constructor-default` cargo features; environment variables override them
//! at run time.

use std::fmt;

/// The two independent fixes for the default-value asymmetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Mitigations {
    /// Drop the default-value hint, so every field is always written.
    pub no_default_hint: bool,
    /// Construct clues with `text` already set to the hinted default.
    pub constructor_default: bool,
}

impl Mitigations {
    /// Neither fix applied: reproduces the asymmetry.
    pub const NONE: Self = Self {
        no_default_hint: false,
        constructor_default: false,
    };

    /// All four combinations, unmitigated first.
    pub const ALL: [Self; 4] = [
        Self::NONE,
        Self {
            no_default_hint: true,
            constructor_default: false,
        },
        Self {
            no_default_hint: false,
            constructor_default: true,
        },
        Self {
            no_default_hint: true,
            constructor_default: true,
        },
    ];

    /// Switches selected by cargo features at build time.
    pub const fn from_features() -> Self {
        Self {
            no_default_hint: cfg!(feature = "no-default-hint"),
            constructor_default: cfg!(feature = "constructor-default"),
        }
    }

    /// Returns true when at least one fix is active.
    pub fn is_mitigated(&self) -> bool {
        self.no_default_hint || self.constructor_default
    }
}

impl fmt::Display for Mitigations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.no_default_hint, self.constructor_default) {
            (false, false) => f.write_str("unmitigated"),
            (true, false) => f.write_str("no-default-hint"),
            (false, true) => f.write_str("constructor-default"),
            (true, true) => f.write_str("no-default-hint+constructor-default"),
        }
    }
}

/// Configuration for the demo binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// Fixes applied to the single demo run.
    pub mitigations: Mitigations,
    /// Run every combination instead of just `mitigations`.
    pub all_modes: bool,
    /// Log level filter for tracing.
    pub log_level: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            mitigations: Mitigations::from_features(),
            all_modes: false,
            log_level: "warn".to_owned(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Effect |
    /// |---|---|
    /// | `NO_DEFAULT_HINT` | overrides the `no-default-hint` feature |
    /// | `CONSTRUCTOR_DEFAULT` | overrides the `constructor-default` feature |
    /// | `DEMO_ALL_MODES` | run all four combinations |
    /// | `LOG_LEVEL` | tracing filter, default `warn` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("NO_DEFAULT_HINT") {
            config.mitigations.no_default_hint = is_truthy(&v);
        }
        if let Some(v) = lookup("CONSTRUCTOR_DEFAULT") {
            config.mitigations.constructor_default = is_truthy(&v);
        }
        if let Some(v) = lookup("DEMO_ALL_MODES") {
            config.all_modes = is_truthy(&v);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}

fn is_truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}
