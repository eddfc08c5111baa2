use super::schema::Config;

macro_rules! define_credentials {
    ($( $name:literal, $env:literal => $($path:ident).+ );* $(;)?) => {
        /// All known setting slot names.
        pub const CREDENTIAL_NAMES: &[&str] = &[$($name),*];

        /// (slot name, env var name) pairs.
        pub const CREDENTIAL_ENV_VARS: &[(&str, &str)] = &[$(($name, $env)),*];

        /// Get the current value of a setting by slot name.
        pub fn get_credential_value<'a>(config: &'a Config, name: &str) -> Option<&'a str> {
            match name {
                $($name => Some(config.$($path).+.as_str()),)*
                _ => None,
            }
        }

        /// Apply environment variable overrides.
        ///
        /// Any listed env var that is set and non-empty overwrites the
        /// corresponding config field, so secrets can come from the
        /// environment or a `.env` file instead of `config.json`.
        pub fn apply_env_overrides(config: &mut Config) {
            $(
                if let Ok(val) = std::env::var($env) {
                    if !val.is_empty() {
                        config.$($path).+ = val;
                    }
                }
            )*
        }
    };
}

define_credentials! {
    "line-channel-access-token", "CHANNEL_ACCESS_TOKEN" => line.channel_access_token;
    "line-channel-secret",       "CHANNEL_SECRET"       => line.channel_secret;
    "gemini-api-key",            "GEMINI_API_KEY"       => providers.gemini.api_key;
    "catalog-path",              "MYGO_CATALOG_PATH"    => catalog.path;
}

/// Detect where a setting value came from, for `mygo-bot status`.
pub fn detect_source(name: &str, config: &Config) -> &'static str {
    let env_var = CREDENTIAL_ENV_VARS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, e)| *e);

    if let Some(var) = env_var
        && let Ok(val) = std::env::var(var)
        && !val.is_empty()
    {
        return "env";
    }

    if let Some(val) = get_credential_value(config, name)
        && !val.is_empty()
    {
        return "config";
    }

    "[empty]"
}
