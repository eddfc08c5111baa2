use crate::catalog::ImageCatalog;
use crate::config::Config;
use crate::conversation::{ConversationStore, JsonFileStore};
use anyhow::Result;
use std::path::Path;

#[derive(Debug)]
enum CheckResult {
    Pass(String),
    Fail(String),
    Skip(String),
}

impl CheckResult {
    fn label(&self) -> &'static str {
        match self {
            Self::Pass(_) => "PASS",
            Self::Fail(_) => "FAIL",
            Self::Skip(_) => "SKIP",
        }
    }

    fn detail(&self) -> &str {
        match self {
            Self::Pass(s) | Self::Fail(s) | Self::Skip(s) => s,
        }
    }

    fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

fn print_check(name: &str, result: &CheckResult) {
    println!("  {:<6} {:<24} {}", result.label(), name, result.detail());
}

fn check_config_exists(path: &Path) -> CheckResult {
    if path.exists() {
        CheckResult::Pass(path.display().to_string())
    } else {
        CheckResult::Skip(format!("not found at {}, using defaults", path.display()))
    }
}

fn check_config_loads(loaded: &Result<Config>) -> CheckResult {
    match loaded {
        Ok(_) => CheckResult::Pass("parses and validates".to_string()),
        Err(e) => CheckResult::Fail(format!("{:#}", e)),
    }
}

fn check_line_credentials(config: &Config) -> CheckResult {
    match config.require_line_credentials() {
        Ok(()) => CheckResult::Pass("access token and secret set".to_string()),
        Err(e) => CheckResult::Fail(e.to_string()),
    }
}

fn check_catalog(config: &Config) -> CheckResult {
    let path = config.catalog_path();
    match ImageCatalog::load(&path) {
        Ok(catalog) if catalog.is_empty() => {
            CheckResult::Fail(format!("{} has no entries", path.display()))
        }
        Ok(catalog) => CheckResult::Pass(format!("{} image(s)", catalog.len())),
        Err(e) => CheckResult::Fail(format!("{:#}", e)),
    }
}

async fn check_conversation_log(config: &Config) -> CheckResult {
    let path = match config.store_path() {
        Ok(path) => path,
        Err(e) => return CheckResult::Fail(format!("{:#}", e)),
    };
    let display = path.display().to_string();
    match JsonFileStore::new(path).load().await {
        Ok(log) => CheckResult::Pass(format!("{} ({} conversation(s))", display, log.len())),
        Err(e) => CheckResult::Fail(format!("{:#}", e)),
    }
}

fn check_gemini(config: &Config) -> CheckResult {
    let gemini = &config.providers.gemini;
    if gemini.is_configured() {
        CheckResult::Pass(format!("model {}", gemini.model))
    } else {
        CheckResult::Skip("no API key, free-form messages get the help text".to_string())
    }
}

fn check_config_file_permissions(path: &Path) -> CheckResult {
    if !path.exists() {
        return CheckResult::Skip("config file not found".to_string());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = std::fs::metadata(path) {
            let mode = meta.permissions().mode() & 0o777;
            if mode.trailing_zeros() >= 6 {
                CheckResult::Pass(format!("{:o}", mode))
            } else {
                CheckResult::Fail(format!(
                    "{:o} (group/world readable, run: chmod 600 {})",
                    mode,
                    path.display()
                ))
            }
        } else {
            CheckResult::Skip("cannot read metadata".to_string())
        }
    }

    #[cfg(not(unix))]
    CheckResult::Skip("permission check not available on this platform".to_string())
}

pub async fn doctor_command(config_path: Option<&Path>) -> Result<()> {
    let path = super::commands::resolve_config_path(config_path)?;

    println!("mygo-bot doctor\n");
    println!("{}", "=".repeat(60));

    let mut pass_count = 0u32;
    let mut fail_count = 0u32;
    let mut skip_count = 0u32;

    let mut record = |name: &str, result: &CheckResult| {
        print_check(name, result);
        match result {
            CheckResult::Pass(_) => pass_count += 1,
            CheckResult::Fail(_) => fail_count += 1,
            CheckResult::Skip(_) => skip_count += 1,
        }
    };

    println!("\n  Config");
    println!("  {}", "-".repeat(56));

    record("Config file", &check_config_exists(&path));
    record("Config permissions", &check_config_file_permissions(&path));
    let loaded = crate::config::load_config(Some(&path));
    record("Config loads", &check_config_loads(&loaded));

    if let Ok(config) = &loaded {
        println!("\n  Bot");
        println!("  {}", "-".repeat(56));

        record("LINE credentials", &check_line_credentials(config));
        record("Image catalog", &check_catalog(config));
        record("Conversation log", &check_conversation_log(config).await);
        record("Gemini", &check_gemini(config));
    }

    println!("\n{}", "=".repeat(60));
    println!(
        "  {} passed, {} failed, {} skipped",
        pass_count, fail_count, skip_count
    );

    if fail_count > 0 {
        anyhow::bail!("{} check(s) failed", fail_count);
    }
    println!("\n  All checks passed!");
    Ok(())
}
