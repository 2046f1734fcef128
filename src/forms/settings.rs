use crate::forms::{FieldKind, FieldSpec, Form};

/// Setting names and their labels. Every toggle starts out on.
pub const SETTINGS_FIELDS: [(&str, &str); 6] = [
    ("forums_watch_new_thread", "Watch forum threads I start"),
    ("forums_watch_after_reply", "Watch forum threads I comment in"),
    ("kbforums_watch_new_thread", "Watch KB discussion threads I start"),
    ("kbforums_watch_after_reply", "Watch KB discussion threads I comment in"),
    ("questions_watch_after_reply", "Watch Question threads I comment in"),
    ("email_private_messages", "Send emails for private messages"),
];

pub struct SettingsForm;

impl Form for SettingsForm {
    fn fields(&self) -> Vec<FieldSpec> {
        SETTINGS_FIELDS
            .iter()
            .map(|(name, _label)| FieldSpec::new(*name, FieldKind::Boolean))
            .collect()
    }
}
