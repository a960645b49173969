//! # Slash-Command Palette
//!
//! Keystroke-driven state machine for the `/` command menu. The state
//! lives on the editor as a typed field — the key handler and the UI
//! layer read and write the same struct, no string-keyed storage.
//!
//! The machine never consumes content keystrokes: the trigger `/`, query
//! characters, and backspaces all reach the document; execution deletes
//! the `/`+query text range before running the selected command.

use crate::blocks::apply_command_action;
use crate::editor::Editor;
use crate::interact::{Layout, Point};
use crate::EditorError;
use serde::{Deserialize, Serialize};

/// Gap between the caret and the opened menu.
const MENU_OFFSET: f64 = 8.0;

/// Slash-menu state: created closed; opened on the trigger keystroke;
/// reset to closed+empty on execute/escape/invalidating backspace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlashMenuState {
    pub show: bool,
    pub position: Point,
    pub query: String,
    pub selected_index: usize,
}

impl SlashMenuState {
    pub fn reset(&mut self) {
        self.show = false;
        self.query.clear();
        self.selected_index = 0;
    }
}

/// What a slash command does to the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CommandAction {
    Paragraph,
    Heading(u8),
    BulletList,
    OrderedList,
    Blockquote,
    CodeBlock,
    Divider,
    Table,
}

/// Command item definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlashCommandItem {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub action: CommandAction,
}

/// Default slash commands available, in display order
pub const DEFAULT_SLASH_COMMANDS: [SlashCommandItem; 10] = [
    SlashCommandItem {
        title: "Text",
        description: "Plain text paragraph",
        icon: "bi-text-paragraph",
        action: CommandAction::Paragraph,
    },
    SlashCommandItem {
        title: "Heading 1",
        description: "Large section heading",
        icon: "bi-type-h1",
        action: CommandAction::Heading(1),
    },
    SlashCommandItem {
        title: "Heading 2",
        description: "Medium section heading",
        icon: "bi-type-h2",
        action: CommandAction::Heading(2),
    },
    SlashCommandItem {
        title: "Heading 3",
        description: "Small section heading",
        icon: "bi-type-h3",
        action: CommandAction::Heading(3),
    },
    SlashCommandItem {
        title: "Bullet List",
        description: "Create a bullet list",
        icon: "bi-list-ul",
        action: CommandAction::BulletList,
    },
    SlashCommandItem {
        title: "Numbered List",
        description: "Create a numbered list",
        icon: "bi-list-ol",
        action: CommandAction::OrderedList,
    },
    SlashCommandItem {
        title: "Quote",
        description: "Capture a quote",
        icon: "bi-quote",
        action: CommandAction::Blockquote,
    },
    SlashCommandItem {
        title: "Code Block",
        description: "Display code with syntax highlighting",
        icon: "bi-code-square",
        action: CommandAction::CodeBlock,
    },
    SlashCommandItem {
        title: "Divider",
        description: "Visual divider line",
        icon: "bi-hr",
        action: CommandAction::Divider,
    },
    SlashCommandItem {
        title: "Table",
        description: "Add a simple table",
        icon: "bi-table",
        action: CommandAction::Table,
    },
];

/// Filter commands by query: case-insensitive substring match against
/// title or description. An empty query returns everything, in order.
pub fn filter_slash_commands<'a>(
    items: &'a [SlashCommandItem],
    query: &str,
) -> Vec<&'a SlashCommandItem> {
    let normalized = query.to_lowercase();
    if normalized.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            item.title.to_lowercase().contains(&normalized)
                || item.description.to_lowercase().contains(&normalized)
        })
        .collect()
}

/// Keys the palette reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlashKey {
    Character(char),
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Backspace,
}

/// Whether the keystroke was consumed by the menu or should continue
/// into the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyOutcome {
    Handled,
    PassThrough,
}

/// Feed a keystroke through the palette state machine.
///
/// `PassThrough` keystrokes must still be applied to the document by the
/// caller (see [`type_char`] / [`backspace`] for the combined flow).
pub fn handle_slash_key(editor: &mut Editor, key: SlashKey, layout: &dyn Layout) -> KeyOutcome {
    if !editor.slash_menu.show {
        // Open on "/" at start of block or after a space
        if key == SlashKey::Character('/') {
            let text_before = editor.text_before_cursor();
            if text_before.is_empty() || text_before.ends_with(' ') {
                let coords = layout.coords_at_pos(editor.selection().head);
                editor.slash_menu.position = Point {
                    top: coords.bottom() + MENU_OFFSET,
                    left: coords.left,
                };
                editor.slash_menu.query.clear();
                editor.slash_menu.selected_index = 0;
                editor.slash_menu.show = true;
            }
        }
        // The "/" itself is still inserted
        return KeyOutcome::PassThrough;
    }

    let filtered_count = filter_slash_commands(&DEFAULT_SLASH_COMMANDS, &editor.slash_menu.query).len();

    match key {
        SlashKey::ArrowDown => {
            let max = filtered_count.saturating_sub(1);
            editor.slash_menu.selected_index = (editor.slash_menu.selected_index + 1).min(max);
            KeyOutcome::Handled
        }
        SlashKey::ArrowUp => {
            editor.slash_menu.selected_index = editor.slash_menu.selected_index.saturating_sub(1);
            KeyOutcome::Handled
        }
        SlashKey::Enter => {
            let filtered =
                filter_slash_commands(&DEFAULT_SLASH_COMMANDS, &editor.slash_menu.query);
            match filtered.get(editor.slash_menu.selected_index).copied() {
                Some(command) => {
                    let command = *command;
                    if let Err(error) = execute_slash_command(editor, &command) {
                        tracing::warn!(%error, "slash command failed");
                    }
                }
                // Empty filtered list: no-op, menu stays open
                None => {}
            }
            KeyOutcome::Handled
        }
        SlashKey::Escape => {
            editor.slash_menu.reset();
            KeyOutcome::Handled
        }
        SlashKey::Backspace => {
            // Inspected before the deletion applies, like the key event
            let text_before = editor.text_before_cursor();
            if text_before == "/" || !text_before.contains('/') {
                editor.slash_menu.reset();
            } else {
                editor.slash_menu.query.pop();
                editor.slash_menu.selected_index = 0;
            }
            KeyOutcome::PassThrough
        }
        SlashKey::Character(c) => {
            editor.slash_menu.query.push(c);
            editor.slash_menu.selected_index = 0;
            KeyOutcome::PassThrough
        }
    }
}

/// Execute a slash command: delete the `/`+query text, run the command's
/// document mutation, close the menu.
pub fn execute_slash_command(
    editor: &mut Editor,
    command: &SlashCommandItem,
) -> Result<(), EditorError> {
    let text_before = editor.text_before_cursor();
    let deleted = match text_before.rfind('/') {
        Some(slash_byte) => {
            let caret = editor.selection().head;
            let removed = text_before[slash_byte..].chars().count();
            editor
                .chain()
                .focus()
                .delete_range(caret - removed, caret)
                .run()
                .map(|_| ())
        }
        None => Ok(()),
    };

    let result = deleted.and_then(|()| apply_command_action(editor, command.action));

    // The menu closes on execute even when the mutation was rejected
    editor.slash_menu.reset();
    result
}

/// Type one character: palette state first, then the document insert.
pub fn type_char(
    editor: &mut Editor,
    c: char,
    layout: &dyn Layout,
) -> Result<KeyOutcome, EditorError> {
    let outcome = handle_slash_key(editor, SlashKey::Character(c), layout);
    if outcome == KeyOutcome::PassThrough {
        editor.insert_text(&c.to_string())?;
    }
    Ok(outcome)
}

/// Backspace: palette state first, then the document deletion.
pub fn backspace(
    editor: &mut Editor,
    layout: &dyn Layout,
) -> Result<KeyOutcome, EditorError> {
    let outcome = handle_slash_key(editor, SlashKey::Backspace, layout);
    if outcome == KeyOutcome::PassThrough {
        editor.delete_backward()?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_empty_query_returns_all_in_order() {
        let all = filter_slash_commands(&DEFAULT_SLASH_COMMANDS, "");
        assert_eq!(all.len(), 10);
        assert_eq!(all[0].title, "Text");
        assert_eq!(all[9].title, "Table");
    }

    #[test]
    fn test_filter_case_insensitive() {
        let headings = filter_slash_commands(&DEFAULT_SLASH_COMMANDS, "HEADING");
        assert_eq!(headings.len(), 3);
        assert!(headings.iter().all(|c| c.title.starts_with("Heading")));
    }

    #[test]
    fn test_filter_matches_description() {
        let quote = filter_slash_commands(&DEFAULT_SLASH_COMMANDS, "capture");
        assert_eq!(quote.len(), 1);
        assert_eq!(quote[0].title, "Quote");
    }

    #[test]
    fn test_filter_no_match() {
        assert!(filter_slash_commands(&DEFAULT_SLASH_COMMANDS, "zzz").is_empty());
    }
}
