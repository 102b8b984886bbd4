use std::env;

/// Verbosity used when installing a log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Get level from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            "off" | "none" => Some(LogLevel::Off),
            _ => None,
        }
    }

    /// Directive understood by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Resolver map construction settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Always emit `Query`, `Mutation` and `Subscription`, even when a
    /// resolver declares nothing for them. Off by default: engines may
    /// reject resolver objects for types the schema does not define.
    pub emit_empty_roots: bool,

    /// Log registrations, builds and resolver invocations
    pub enable_logging: bool,

    /// Level used by [`crate::logging`] when installing a subscriber
    pub log_level: LogLevel,
}

impl ResolverConfig {
    /// Create a configuration with defaults
    ///
    /// # Example
    ///
    /// ```
    /// use armature_graphql::ResolverConfig;
    ///
    /// let config = ResolverConfig::new();
    /// assert!(!config.emit_empty_roots);
    /// assert!(config.enable_logging);
    /// ```
    pub fn new() -> Self {
        Self {
            emit_empty_roots: false,
            enable_logging: true,
            log_level: LogLevel::Info,
        }
    }

    /// Read overrides from the environment.
    ///
    /// - `ARMATURE_GRAPHQL_EMIT_EMPTY_ROOTS=1|0`
    /// - `ARMATURE_GRAPHQL_LOGGING=1|0`
    /// - `ARMATURE_GRAPHQL_LOG_LEVEL=trace|debug|info|warn|error|off`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::new();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        Self {
            emit_empty_roots: flag("ARMATURE_GRAPHQL_EMIT_EMPTY_ROOTS", defaults.emit_empty_roots),
            enable_logging: flag("ARMATURE_GRAPHQL_LOGGING", defaults.enable_logging),
            log_level: lookup("ARMATURE_GRAPHQL_LOG_LEVEL")
                .and_then(|s| LogLevel::parse(&s))
                .unwrap_or(defaults.log_level),
        }
    }

    pub fn with_empty_roots(mut self, enable: bool) -> Self {
        self.emit_empty_roots = enable;
        self
    }

    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}
