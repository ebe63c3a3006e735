use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Terminal output helpers shared by the command handlers
#[derive(Debug, Clone, Copy)]
pub struct Display {
    use_color: bool,
}

impl Display {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Create a spinner for network operations
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = if self.use_color {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        };

        if self.use_color {
            if let Ok(style) = ProgressStyle::default_spinner()
                .tick_strings(&["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈"])
                .template("{spinner:.green} {msg}")
            {
                pb.set_style(style);
            }
            pb.set_message(message.to_string());
            pb.enable_steady_tick(Duration::from_millis(120));
        }

        pb
    }

    pub fn header(&self, message: &str) {
        println!("{} {}", "::".blue().bold(), message);
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message);
    }

    pub fn failure(&self, message: &str) {
        println!("{} {}", "✗".red().bold(), message);
    }

    pub fn detail(&self, message: &str) {
        println!("  {}", message);
    }

    /// Print a table-like structure
    pub fn print_table(&self, headers: &[&str], rows: &[Vec<String>]) {
        if rows.is_empty() {
            return;
        }

        let mut col_widths = headers.iter().map(|h| h.len()).collect::<Vec<_>>();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i < col_widths.len() {
                    col_widths[i] = col_widths[i].max(cell.len());
                }
            }
        }

        let header_line = headers
            .iter()
            .enumerate()
            .map(|(i, header)| format!("{:<width$}", header, width = col_widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", header_line.trim_end().bold());

        for row in rows {
            let line = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let width = col_widths.get(i).copied().unwrap_or(cell.len());
                    format!("{:<width$}", cell, width = width)
                })
                .collect::<Vec<_>>()
                .join("  ");
            println!("{}", line.trim_end());
        }
    }
}
