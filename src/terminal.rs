//! Terminal front end.
//! Implements [`Prompter`] with `dialoguer` prompts. Time fields re-ask until
//! the keystroke filter accepts the input, so refused values never leave this
//! module. Text is entered line by line and ends at an empty line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::app::{Action, Prompter};
use crate::model::TimeField;

#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Prompter for TerminalPrompter {
    fn choose_action(&mut self, title: &str, screen: &str) -> Result<Action> {
        println!("\n=== {} ===\n", title);
        println!("{}", screen);

        let choice = Select::with_theme(&self.theme)
            .with_prompt("Action")
            .items(&Action::MENU)
            .default(0)
            .interact_opt()
            .context("Failed to read action")?;
        // Esc behaves like quit; the controller still guards unsaved changes.
        Ok(choice.map_or(Action::Quit, |i| Action::MENU[i]))
    }

    fn ask_path(&mut self, prompt: &str, current: Option<&Path>) -> Result<Option<PathBuf>> {
        let initial = current.map(|p| p.display().to_string()).unwrap_or_default();
        let input: String = Input::<String>::with_theme(&self.theme)
            .with_prompt(format!("{} (empty to cancel)", prompt))
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()
            .context("Failed to read path")?;
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        Ok(Some(PathBuf::from(input)))
    }

    fn pick_row(&mut self, prompt: &str, rows: &[String], current: Option<usize>) -> Result<Option<usize>> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(rows)
            .default(current.unwrap_or(0))
            .interact_opt()
            .context("Failed to read selection")
    }

    fn confirm(&mut self, title: &str, question: &str) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(format!("{}: {}", title, question))
            .default(false)
            .interact()
            .context("Failed to read confirmation")
    }

    fn notice(&mut self, title: &str, message: &str) -> Result<()> {
        println!("[{}] {}", title, message);
        wait_for_enter(&self.theme)
    }

    fn error(&mut self, title: &str, message: &str) -> Result<()> {
        eprintln!("[{}] {}", title, message);
        wait_for_enter(&self.theme)
    }

    fn ask_time(&mut self, field: TimeField, current: u32, accept: &dyn Fn(&str) -> bool) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(format!("{} (0-{})", field, field.max()))
            .with_initial_text(current.to_string())
            .validate_with(|input: &String| -> Result<(), String> {
                if accept(input) {
                    Ok(())
                } else {
                    Err(format!("digits 0-{} only", field.max()))
                }
            })
            .interact_text()
            .with_context(|| format!("Failed to read {}", field))
    }

    fn ask_line(&mut self, label: &str, current: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(label)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()
            .with_context(|| format!("Failed to read {}", label))
    }

    fn ask_text(&mut self, label: &str, current: &str) -> Result<String> {
        if !current.is_empty() {
            println!("Current {}:\n{}", label.to_lowercase(), current);
        }
        let keep = Confirm::with_theme(&self.theme)
            .with_prompt(format!("Keep current {}?", label.to_lowercase()))
            .default(true)
            .interact()
            .context("Failed to read confirmation")?;
        if keep {
            return Ok(current.to_string());
        }

        println!("Enter {} (finish with an empty line):", label.to_lowercase());
        let mut lines = Vec::new();
        loop {
            let line: String = Input::<String>::with_theme(&self.theme)
                .with_prompt(">")
                .allow_empty(true)
                .interact_text()
                .with_context(|| format!("Failed to read {}", label))?;
            if line.is_empty() {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    fn ask_version(&mut self, current: i64) -> Result<Option<i64>> {
        let input: String = Input::<String>::with_theme(&self.theme)
            .with_prompt("Version (empty to keep)")
            .with_initial_text(current.to_string())
            .allow_empty(true)
            .validate_with(|input: &String| -> Result<(), &'static str> {
                if input.trim().is_empty() || input.trim().parse::<i64>().is_ok() {
                    Ok(())
                } else {
                    Err("whole number expected")
                }
            })
            .interact_text()
            .context("Failed to read version")?;
        Ok(input.trim().parse().ok())
    }
}

fn wait_for_enter(theme: &ColorfulTheme) -> Result<()> {
    let _: String = Input::<String>::with_theme(theme)
        .with_prompt("Press Enter to continue")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read input")?;
    Ok(())
}
