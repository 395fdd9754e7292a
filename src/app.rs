//! Session controller.
//! Owns the session and the list presenter and turns each user action into
//! calls on the document model. All input and output goes through
//! [`Prompter`], so the controller runs the same against a terminal or a
//! scripted test double.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::model::{Flag, TimeField};
use crate::persist::Session;
use crate::presenter::ListPresenter;
use crate::record_editor::RecordEditor;

/// Something the user can do from the main screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Open,
    Save,
    SaveAs,
    New,
    Add,
    Select,
    Edit,
    Delete,
    Toggle(Flag),
    SetVersion,
    Quit,
}

impl Action {
    pub const MENU: [Action; 13] = [
        Action::Edit,
        Action::Add,
        Action::Delete,
        Action::Select,
        Action::Toggle(Flag::Enabled),
        Action::Toggle(Flag::Utc),
        Action::Toggle(Flag::MissionTime),
        Action::SetVersion,
        Action::Open,
        Action::Save,
        Action::SaveAs,
        Action::New,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Open => write!(f, "Open File"),
            Action::Save => write!(f, "Save"),
            Action::SaveAs => write!(f, "Save As..."),
            Action::New => write!(f, "New File"),
            Action::Add => write!(f, "Add Notification"),
            Action::Select => write!(f, "Select Notification"),
            Action::Edit => write!(f, "Edit Notification"),
            Action::Delete => write!(f, "Delete Selected Notification"),
            Action::Toggle(flag) => write!(f, "Toggle {}", flag.label()),
            Action::SetVersion => write!(f, "Set Version"),
            Action::Quit => write!(f, "Quit"),
        }
    }
}

/// User interaction surface used by [`App`].
pub trait Prompter {
    /// Shows the screen and returns the chosen action.
    fn choose_action(&mut self, title: &str, screen: &str) -> Result<Action>;

    /// Asks for a file path. `None` means the user backed out.
    fn ask_path(&mut self, prompt: &str, current: Option<&Path>) -> Result<Option<PathBuf>>;

    /// Asks the user to pick one of `rows`.
    fn pick_row(&mut self, prompt: &str, rows: &[String], current: Option<usize>) -> Result<Option<usize>>;

    fn confirm(&mut self, title: &str, question: &str) -> Result<bool>;

    /// Blocking informational message.
    fn notice(&mut self, title: &str, message: &str) -> Result<()>;

    /// Blocking error message.
    fn error(&mut self, title: &str, message: &str) -> Result<()>;

    /// Asks for a new time field value. `accept` is the keystroke filter;
    /// front ends that can should refuse input it rejects.
    fn ask_time(&mut self, field: TimeField, current: u32, accept: &dyn Fn(&str) -> bool) -> Result<String>;

    fn ask_line(&mut self, label: &str, current: &str) -> Result<String>;

    /// Multi-line entry.
    fn ask_text(&mut self, label: &str, current: &str) -> Result<String>;

    fn ask_version(&mut self, current: i64) -> Result<Option<i64>>;
}

pub struct App<P> {
    session: Session,
    presenter: ListPresenter,
    prompter: P,
}

impl<P: Prompter> App<P> {
    pub fn new(prompter: P) -> Self {
        Self {
            session: Session::new(),
            presenter: ListPresenter::new(),
            prompter,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub fn presenter(&self) -> &ListPresenter {
        &self.presenter
    }

    #[cfg(test)]
    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Loads `path`, reporting failure to the user instead of returning it.
    pub fn open_path(&mut self, path: &Path) -> Result<()> {
        match self.session.load(path) {
            Ok(()) => {
                self.presenter.clear_selection();
                Ok(())
            }
            Err(e) => self.prompter.error("Error", &format!("Could not open file: {}", e)),
        }
    }

    /// Main loop. Returns when the user quits.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let screen = self.presenter.render(self.session.config());
            let action = self.prompter.choose_action(&self.session.title(), &screen)?;
            if !self.dispatch(action)? {
                return Ok(());
            }
        }
    }

    /// Performs one action. Returns false once the session should end.
    pub fn dispatch(&mut self, action: Action) -> Result<bool> {
        info!(%action, "action");
        match action {
            Action::Open => self.open()?,
            Action::Save => self.save()?,
            Action::SaveAs => self.save_as()?,
            Action::New => self.new_document()?,
            Action::Add => self.add(),
            Action::Select => self.select()?,
            Action::Edit => self.edit()?,
            Action::Delete => self.delete()?,
            Action::Toggle(flag) => {
                flag.toggle(self.session.config_mut());
            }
            Action::SetVersion => self.set_version()?,
            Action::Quit => return self.quit(),
        }
        Ok(true)
    }

    fn open(&mut self) -> Result<()> {
        if !self.discard_ok()? {
            return Ok(());
        }
        let Some(path) = self.prompter.ask_path("Open notification file", self.session.path())? else {
            return Ok(());
        };
        self.open_path(&path)
    }

    fn save(&mut self) -> Result<()> {
        if self.session.path().is_none() {
            return self.save_as();
        }
        match self.session.save() {
            Ok(path) => {
                let message = format!("File saved: {}", path.display());
                self.prompter.notice("Success", &message)
            }
            Err(e) => self.prompter.error("Error", &format!("Could not save file: {}", e)),
        }
    }

    fn save_as(&mut self) -> Result<()> {
        let Some(path) = self.prompter.ask_path("Save notification file as", self.session.path())? else {
            return Ok(());
        };
        match self.session.save_as(&path) {
            Ok(()) => self.prompter.notice("Success", &format!("File saved: {}", path.display())),
            Err(e) => self.prompter.error("Error", &format!("Could not save file: {}", e)),
        }
    }

    fn new_document(&mut self) -> Result<()> {
        if self.discard_ok()? {
            self.session.new_document();
            self.presenter.clear_selection();
        }
        Ok(())
    }

    fn add(&mut self) {
        self.session.config_mut().add_notification();
        self.presenter.select_last(self.session.config());
    }

    fn select(&mut self) -> Result<()> {
        let Some(index) = self.pick("Select notification")? else {
            return Ok(());
        };
        self.select_index(index)
    }

    fn edit(&mut self) -> Result<()> {
        let Some(index) = self.pick("Edit notification")? else {
            return Ok(());
        };
        self.select_index(index)?;

        let mut editor = match RecordEditor::open(self.session.config(), index) {
            Ok(editor) => editor,
            Err(e) => return self.prompter.error("Error", &e.to_string()),
        };
        for field in TimeField::ALL {
            let current = field.get(editor.draft());
            let input = self.prompter.ask_time(field, current, &|s: &str| field.accepts_input(s))?;
            editor.set_time(field, &input);
        }
        let title = self.prompter.ask_line("Title", &editor.draft().title)?;
        editor.set_title(title);
        let text = self.prompter.ask_text("Text", &editor.draft().text)?;
        editor.set_text(text);
        let icon = self.prompter.ask_line("Icon", &editor.draft().icon)?;
        editor.set_icon(icon);
        let color = self.prompter.ask_line("Color", &editor.draft().color)?;
        editor.set_color(color);

        if !self.prompter.confirm("Edit Notification", "Save changes?")? {
            editor.cancel();
            return Ok(());
        }
        // Only committed edits dirty the session.
        let mut config = self.session.config().clone();
        match editor.commit(&mut config) {
            Ok(()) => {
                *self.session.config_mut() = config;
                Ok(())
            }
            Err(e) => self.prompter.error("Error", &e.to_string()),
        }
    }

    fn delete(&mut self) -> Result<()> {
        let Some(index) = self.presenter.selected() else {
            return self
                .prompter
                .notice("No selection", "Please select an entry to delete.");
        };
        if !self
            .prompter
            .confirm("Confirm deletion", "Are you sure you want to delete this notification?")?
        {
            return Ok(());
        }
        match self.session.config_mut().delete_notification(index) {
            Ok(_) => {
                let len = self.session.config().notifications.len();
                self.presenter.after_delete(len);
                Ok(())
            }
            Err(e) => self.prompter.error("Error", &e.to_string()),
        }
    }

    fn set_version(&mut self) -> Result<()> {
        if let Some(version) = self.prompter.ask_version(self.session.config().version)? {
            self.session.config_mut().set_version(version);
        }
        Ok(())
    }

    fn quit(&mut self) -> Result<bool> {
        Ok(!self.discard_ok()?)
    }

    /// Asks before throwing away unsaved changes.
    fn discard_ok(&mut self) -> Result<bool> {
        if !self.session.is_dirty() {
            return Ok(true);
        }
        self.prompter
            .confirm("Unsaved changes", "Discard unsaved changes?")
    }

    fn pick(&mut self, prompt: &str) -> Result<Option<usize>> {
        let rows = self.presenter.row_labels(self.session.config());
        if rows.is_empty() {
            self.prompter.notice("No notifications", "Add a notification first.")?;
            return Ok(None);
        }
        self.prompter.pick_row(prompt, &rows, self.presenter.selected())
    }

    fn select_index(&mut self, index: usize) -> Result<()> {
        if let Err(e) = self.presenter.select(self.session.config(), index) {
            return self.prompter.error("Error", &e.to_string());
        }
        Ok(())
    }
}
