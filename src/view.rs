use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::controller::{EditState, NoteView, RowMode, UiState};

/// Renders the notes page from the controller state.
#[derive(Debug, Default)]
pub struct NotesPage<'a> {
    /// Shown after "Signed in as"; `None` once the session has ended
    pub signed_in_as: Option<&'a str>,
    pub error: Option<&'a str>,
}

impl NotesPage<'_> {
    pub fn render(&self, state: &UiState) -> String {
        let banner = self.signed_in_as.map_or_else(
            || "<p>Signed out</p>".to_string(),
            |name| format!("<p>Signed in as <strong>{}</strong></p>", encode_text(name)),
        );

        let error = self
            .error
            .map(|message| format!(r#"<p class="error">{}</p>"#, encode_text(message)))
            .unwrap_or_default();

        let selected = state
            .draft
            .file
            .as_ref()
            .map(|file| {
                format!(
                    r#"<div class="selected">Selected: {}</div>"#,
                    encode_text(&file.file_name)
                )
            })
            .unwrap_or_default();

        let rows: String = state
            .notes
            .iter()
            .map(|view| match (state.row_mode(&view.note.id), &state.editing) {
                (RowMode::Editing, Some(edit)) => render_edit_row(edit),
                _ => render_note_row(view),
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Notes</title>
    <style>
        main {{ padding: 24px; max-width: 720px; font-family: sans-serif; }}
        .create, .edit {{ display: grid; gap: 8px; grid-template-columns: 1fr 1fr auto; }}
        .actions {{ margin-top: 8px; display: flex; gap: 8px; }}
        ul {{ list-style: none; padding: 0; display: grid; gap: 12px; }}
        li {{ border: 1px solid #ddd; border-radius: 8px; padding: 12px; }}
        .row {{ display: flex; justify-content: space-between; align-items: center; gap: 8px; }}
        .description {{ color: #555; }}
        img {{ margin-top: 8px; max-width: 320px; border-radius: 6px; }}
        .error {{ color: #b00020; }}
    </style>
</head>
<body>
<main>
    <h1>Notes</h1>
    {banner}
    {error}
    <form method="post" action="/ui/create" enctype="multipart/form-data">
        <div class="create">
            <input name="name" value="{name}" placeholder="Note name">
            <input name="description" value="{description}" placeholder="Description (optional)">
            <input name="file" type="file" accept="image/*">
        </div>
        {selected}
        <div class="actions">
            <button type="submit">Create</button>
            <button type="submit" formaction="/ui/sign-out" formenctype="application/x-www-form-urlencoded">Sign out</button>
        </div>
    </form>
    <hr style="margin: 16px 0">
    <ul>
{rows}    </ul>
</main>
</body>
</html>
"#,
            name = encode_double_quoted_attribute(&state.draft.name),
            description = encode_double_quoted_attribute(&state.draft.description),
        )
    }
}

fn render_note_row(view: &NoteView) -> String {
    let note = &view.note;
    let id = encode_double_quoted_attribute(&note.id);

    let description = note
        .description
        .as_deref()
        .filter(|description| !description.is_empty())
        .map(|description| {
            format!(
                r#"<div class="description">{}</div>"#,
                encode_text(description)
            )
        })
        .unwrap_or_default();

    let image = view
        .image_url
        .as_deref()
        .map(|url| {
            format!(
                r#"<img src="{}" alt="{}">"#,
                encode_double_quoted_attribute(url),
                encode_double_quoted_attribute(&note.name)
            )
        })
        .unwrap_or_default();

    format!(
        r#"        <li>
            <div class="row">
                <div><strong>{name}</strong>{description}</div>
                <div class="actions">
                    <form method="post" action="/ui/notes/{id}/edit"><button type="submit">Edit</button></form>
                    <form method="post" action="/ui/notes/{id}/delete"><button type="submit">Delete</button></form>
                </div>
            </div>
            {image}
        </li>
"#,
        name = encode_text(&note.name),
    )
}

fn render_edit_row(edit: &EditState) -> String {
    format!(
        r#"        <li>
            <form method="post" action="/ui/edit/save" class="edit">
                <input name="name" value="{name}" placeholder="Name">
                <input name="description" value="{description}" placeholder="Description">
                <div class="actions">
                    <button type="submit">Save</button>
                    <button type="submit" formaction="/ui/edit/cancel">Cancel</button>
                </div>
            </form>
        </li>
"#,
        name = encode_double_quoted_attribute(&edit.name),
        description = encode_double_quoted_attribute(&edit.description),
    )
}
