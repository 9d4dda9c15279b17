//! `ledgergate config` subcommands.

use lg_domain::config::{Config, ConfigSeverity};

/// Print every validation issue and return whether the config is
/// usable (no errors; warnings are fine).
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("{config_path}: OK");
        return true;
    }

    for issue in &issues {
        println!("{issue}");
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        println!("{config_path}: {errors} error(s)");
        false
    } else {
        println!("{config_path}: OK ({} warning(s))", issues.len());
        true
    }
}

/// Dump the resolved configuration, defaults included.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("failed to render config: {e}"),
    }
}
