use std::fmt::Write as _;

use crate::cli::Startup;
use crate::core::config::Config;
use crate::core::credential::Credential;
use crate::core::persona::PersonaConfig;

pub fn print_status(startup: &Startup) {
    print!(
        "{}",
        format_status(
            &startup.credential,
            &startup.base_url,
            &startup.config,
            &PersonaConfig::default(),
        )
    );
}

pub fn format_status(
    credential: &Credential,
    base_url: &str,
    config: &Config,
    persona: &PersonaConfig,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", credential.status_line());
    if !credential.is_present() {
        for hint in Credential::setup_hints() {
            let _ = writeln!(out, "  {hint}");
        }
    }
    let _ = writeln!(out, "Current configuration:");
    let _ = writeln!(out, "  base-url: {base_url}");
    let _ = writeln!(out, "  model: {}", persona.model());
    let _ = writeln!(out, "  max-output-tokens: {}", persona.max_output_tokens());
    let _ = writeln!(out, "  typing-delay: {}ms", config.typing_delay().as_millis());
    match Config::config_path() {
        Some(path) => {
            let _ = writeln!(out, "  config-file: {}", path.display());
        }
        None => {
            let _ = writeln!(out, "  config-file: (unavailable)");
        }
    }
    out
}
