use std::env;
use std::path::PathBuf;

const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

/// SMTP settings for the investor onboarding emails.
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub display_name: String,
    pub admin_email: Option<String>,
}

impl MailConfig {
    /// `"Display Name" <from@address>`
    pub fn sender(&self) -> String {
        format!("\"{}\" <{}>", self.display_name, self.from)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub sheets_dir: PathBuf,
    pub cors_origins: Vec<String>,
    pub hash_passwords: bool,
    pub upload_max_bytes: usize,
    pub mail: MailConfig,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match non_empty(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

fn parse_bool(key: &str) -> bool {
    non_empty(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl AppConfig {
    /// Reads configuration from the environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self, String> {
        let mail = MailConfig {
            host: non_empty("EMAIL_HOST"),
            port: parse_or("EMAIL_PORT", 465u16)?,
            user: non_empty("EMAIL_USER"),
            password: non_empty("EMAIL_PASSWORD"),
            from: non_empty("EMAIL_FROM").unwrap_or_else(|| "no-reply@localhost".to_string()),
            display_name: non_empty("EMAIL_DISPLAY_NAME")
                .unwrap_or_else(|| "TheOneAlpha".to_string()),
            admin_email: non_empty("ADMIN_EMAIL"),
        };

        Ok(Self {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000u16)?,
            sheets_dir: PathBuf::from(non_empty("SHEETS_DIR").unwrap_or_else(|| "sheets".to_string())),
            cors_origins: non_empty("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            hash_passwords: parse_bool("HASH_PASSWORDS"),
            upload_max_bytes: parse_or("UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES)?,
            mail,
        })
    }
}
