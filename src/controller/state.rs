use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{FileSummary, Note, Upload};

/// A listed note plus the display link resolved for its image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NoteView {
    #[serde(flatten)]
    pub note: Note,
    /// Short-lived link to the image, absent when there is none to show
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NoteView {
    pub const fn without_image(note: Note) -> Self {
        Self {
            note,
            image_url: None,
        }
    }
}

/// Fields of the create form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Draft {
    pub name: String,
    pub description: String,
    #[schema(value_type = Option<FileSummary>)]
    pub file: Option<Upload>,
}

/// The note currently open in the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EditState {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RowMode {
    Viewing,
    Editing,
}

/// Everything the page renders from. The note list changes only on refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct UiState {
    pub notes: Vec<NoteView>,
    pub draft: Draft,
    pub editing: Option<EditState>,
}

impl UiState {
    pub fn row_mode(&self, id: &str) -> RowMode {
        match &self.editing {
            Some(edit) if edit.id == id => RowMode::Editing,
            _ => RowMode::Viewing,
        }
    }

    pub fn find(&self, id: &str) -> Option<&NoteView> {
        self.notes.iter().find(|view| view.note.id == id)
    }

    pub fn set_draft(&mut self, name: String, description: String) {
        self.draft.name = name;
        self.draft.description = description;
    }

    pub fn select_file(&mut self, file: Option<Upload>) {
        self.draft.file = file;
    }

    pub fn clear_draft(&mut self) {
        self.draft = Draft::default();
    }

    /// Clear the draft only if it still holds `submitted`.
    pub fn clear_draft_if(&mut self, submitted: &Draft) {
        if self.draft == *submitted {
            self.clear_draft();
        }
    }

    /// Put `submitted` back into an empty create form.
    pub fn restore_draft(&mut self, submitted: Draft) {
        if self.draft == Draft::default() {
            self.draft = submitted;
        }
    }

    /// Open the edit form for a listed note, replacing any other open form.
    /// Returns `false` if the note is not in the list.
    pub fn start_edit(&mut self, id: &str) -> bool {
        let Some(view) = self.find(id) else {
            return false;
        };

        self.editing = Some(EditState {
            id: view.note.id.clone(),
            name: view.note.name.clone(),
            description: view.note.description.clone().unwrap_or_default(),
        });
        true
    }

    /// Returns `false` if no note is being edited.
    pub fn set_edit_fields(&mut self, name: String, description: String) -> bool {
        match &mut self.editing {
            Some(edit) => {
                edit.name = name;
                edit.description = description;
                true
            }
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Close the edit form only if it still shows `id`.
    pub fn finish_edit(&mut self, id: &str) {
        if self.editing.as_ref().is_some_and(|edit| edit.id == id) {
            self.editing = None;
        }
    }
}
