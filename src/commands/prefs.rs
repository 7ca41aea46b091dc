use colored::Colorize;

use crate::cli::PrefsCommand;
use crate::config::Config;
use crate::error::Result;
use crate::preferences::{Preferences, Theme};

/// Handle preference commands
pub fn handle_prefs(config: &Config, command: PrefsCommand) -> Result<()> {
    let prefs = Preferences::new(super::open_storage(config)?);

    match command {
        PrefsCommand::Show => {
            println!("theme:    {}", prefs.theme().to_string().cyan());
            println!("language: {}", prefs.language().cyan());
        }
        PrefsCommand::Theme { value } => {
            let theme = if value.trim().eq_ignore_ascii_case("toggle") {
                prefs.toggle_theme()?
            } else {
                let theme: Theme = value.parse()?;
                prefs.set_theme(theme)?;
                theme
            };
            println!("{}", format!("Theme set to {}", theme).green());
        }
        PrefsCommand::Language { code } => {
            prefs.set_language(&code)?;
            println!("{}", format!("Language set to {}", code.trim()).green());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_error_contains, temp_dir, test_config_in};

    #[test]
    fn test_theme_toggle_is_persisted() {
        let dir = temp_dir();
        let config = test_config_in(&dir);

        handle_prefs(
            &config,
            PrefsCommand::Theme {
                value: "toggle".to_string(),
            },
        )
        .unwrap();

        let prefs = Preferences::new(crate::commands::open_storage(&config).unwrap());
        assert_eq!(prefs.theme(), Theme::Dark);
    }

    #[test]
    fn test_invalid_theme_is_rejected() {
        let dir = temp_dir();
        let result = handle_prefs(
            &test_config_in(&dir),
            PrefsCommand::Theme {
                value: "sepia".to_string(),
            },
        );
        assert_error_contains(result, "Invalid theme");
    }

    #[test]
    fn test_language_is_persisted() {
        let dir = temp_dir();
        let config = test_config_in(&dir);
        handle_prefs(
            &config,
            PrefsCommand::Language {
                code: "es".to_string(),
            },
        )
        .unwrap();

        let prefs = Preferences::new(crate::commands::open_storage(&config).unwrap());
        assert_eq!(prefs.language(), "es");
    }
}
