//! Record editor.
//! Holds a draft copy of one notification while its form is open. Time fields
//! refuse input that is not a digit run in range, leaving the previous value
//! in place. Nothing reaches the document until `commit`.

use tracing::debug;

use crate::error::Result;
use crate::model::{Configuration, NotificationFields, TimeField};

#[derive(Debug)]
pub struct RecordEditor {
    index: usize,
    draft: NotificationFields,
}

impl RecordEditor {
    /// Opens a draft seeded from the notification at `index`.
    pub fn open(config: &Configuration, index: usize) -> Result<Self> {
        let draft = config.notification(index)?.fields();
        Ok(Self { index, draft })
    }

    pub fn draft(&self) -> &NotificationFields {
        &self.draft
    }

    /// Replaces a time field with `input`. Returns false and keeps the
    /// previous value when the input is refused.
    pub fn set_time(&mut self, field: TimeField, input: &str) -> bool {
        match field.parse_input(input) {
            Some(value) => {
                field.set(&mut self.draft, value);
                true
            }
            None => {
                debug!(%field, input, "refused time input");
                false
            }
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
    }

    pub fn set_icon(&mut self, icon: impl Into<String>) {
        self.draft.icon = icon.into();
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.draft.color = color.into();
    }

    /// Writes the draft into the document, trimming the text.
    /// On error the notification is left as it was.
    pub fn commit(self, config: &mut Configuration) -> Result<()> {
        let mut fields = self.draft;
        fields.text = fields.text.trim().to_string();
        config.update_notification(self.index, fields)
    }

    /// Drops the draft.
    pub fn cancel(self) {
        debug!(index = self.index, "discarded notification edits");
    }
}
