use crate::forms::{CleanedValue, FieldKind, FieldSpec, Form};
use crate::users::avatars::check_file_size;

pub struct AvatarForm {
    pub max_file_size: u64,
    pub avatar_size: u32,
}

impl AvatarForm {
    pub fn help_text(&self) -> String {
        format!(
            "Your avatar will be resized to {size}x{size}",
            size = self.avatar_size
        )
    }
}

impl Form for AvatarForm {
    fn fields(&self) -> Vec<FieldSpec> {
        vec![FieldSpec::new("avatar", FieldKind::Image).required()]
    }

    fn clean_field(&self, name: &str, value: CleanedValue) -> Result<CleanedValue, String> {
        if name == "avatar" {
            if let Some(file) = value.as_file() {
                check_file_size(file.size(), self.max_file_size).map_err(|err| err.to_string())?;
            }
        }
        Ok(value)
    }
}
