//! Console presentation for CLI results

use console::Style;
use punchcard_core::config::UserConfig;
use punchcard_core::portal::ClassRecord;

/// Output formatter for CLI results
pub struct OutputFormatter {
    green: Style,
    red: Style,
    cyan: Style,
    bold: Style,
    dim: Style,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self {
            green: Style::new().green(),
            red: Style::new().red(),
            cyan: Style::new().cyan(),
            bold: Style::new().bold(),
            dim: Style::new().dim(),
        }
    }
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerate discovered classes with 1-based ordinals.
    pub fn print_classes(&self, classes: &[ClassRecord]) {
        println!();
        println!(
            "{}",
            self.bold
                .apply_to(format!("Found {} classes:", classes.len()))
        );
        for (i, class) in classes.iter().enumerate() {
            let name = if class.name.is_empty() {
                "(unnamed)"
            } else {
                class.name.as_str()
            };
            println!(
                "  {}. {} {}",
                i + 1,
                name,
                self.dim.apply_to(format!("(ID: {})", class.id))
            );
        }
        println!();
    }

    pub fn print_selected(&self, class: &ClassRecord) {
        let name = if class.name.is_empty() {
            "(unnamed)"
        } else {
            class.name.as_str()
        };
        println!(
            "Using class {} {}",
            self.cyan.apply_to(&class.id),
            self.dim.apply_to(format!("({name})"))
        );
    }

    pub fn print_config(&self, user: &str, cfg: &UserConfig) {
        let set_or_not = |v: &str| {
            if v.is_empty() {
                "Not set".to_string()
            } else {
                v.to_string()
            }
        };

        println!();
        println!(
            "{}",
            self.bold.apply_to(format!("Configuration for {user}:"))
        );
        // The cookie is a credential; only show whether it exists.
        println!(
            "Cookie: {}",
            if cfg.cookie.is_empty() { "Not set" } else { "Set" }
        );
        println!("Latitude: {}", set_or_not(&cfg.lat));
        println!("Longitude: {}", set_or_not(&cfg.lng));
        println!("Class ID: {}", set_or_not(&cfg.class_id));
        println!("GPS offset: {}", cfg.offset);
        println!(
            "Auto check-in: {} at {}",
            if cfg.auto_enabled {
                self.green.apply_to("Enabled")
            } else {
                self.dim.apply_to("Disabled")
            },
            cfg.auto_time
        );
        if cfg.notifications.is_empty() {
            println!("Notifications: {}", self.dim.apply_to("Not set"));
        } else {
            println!("Notifications:");
            for (target, level) in &cfg.notifications {
                println!("  {target}: {level}");
            }
        }
        if let Some(last) = cfg.last_auto_run_at {
            println!("Last auto run: {}", self.dim.apply_to(last.to_rfc3339()));
        }
        println!();
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", self.green.apply_to("✔"), message);
    }

    pub fn print_failure(&self, message: &str) {
        eprintln!("{} {}", self.red.apply_to("✘"), message);
    }
}
