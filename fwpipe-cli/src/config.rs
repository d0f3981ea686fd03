/*!
 * Runtime settings
 *
 * Defaults come from `create_default_settings`; environment variables
 * override them. The pipeline itself is never configured here, only the
 * tool's ambient behavior.
 */

/// Log filter for the tool, takes precedence over `RUST_LOG`.
pub const LOG_ENV: &str = "FWPIPE_LOG";
/// `0`, `false`, `no` or `off` disable colored log output.
pub const LOG_ANSI_ENV: &str = "FWPIPE_LOG_ANSI";
const RUST_LOG_ENV: &str = "RUST_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_filter: String,
    pub log_ansi: bool,
}

pub fn create_default_settings() -> Settings {
    Settings {
        log_filter: "warn".to_string(),
        log_ansi: true,
    }
}

impl Default for Settings {
    fn default() -> Self {
        create_default_settings()
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = create_default_settings();

        let filter = lookup(LOG_ENV)
            .or_else(|| lookup(RUST_LOG_ENV))
            .filter(|v| !v.trim().is_empty());
        if let Some(filter) = filter {
            settings.log_filter = filter;
        }

        if let Some(ansi) = lookup(LOG_ANSI_ENV) {
            settings.log_ansi = !matches!(
                ansi.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }

        settings
    }
}
