use crate::assist_db::models::Profile;
use crate::error::AssistError;
use crate::forms::UploadedFile;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use log::{debug, info, warn};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const KB: u64 = 1 << 10;
const MB: u64 = 1 << 20;
const GB: u64 = 1 << 30;

/// Human-readable size with binary multiples, e.g. `128.0 KB`.
pub fn filesizeformat(bytes: u64) -> String {
    match bytes {
        1 => "1 byte".to_string(),
        b if b < KB => format!("{b} bytes"),
        b if b < MB => format!("{:.1} KB", b as f64 / KB as f64),
        b if b < GB => format!("{:.1} MB", b as f64 / MB as f64),
        b => format!("{:.1} GB", b as f64 / GB as f64),
    }
}

pub fn check_file_size(size: u64, max_size: u64) -> Result<(), AssistError> {
    if size > max_size {
        return Err(AssistError::FileTooLarge {
            message: format!(
                "Please upload an image smaller than {}.",
                filesizeformat(max_size)
            ),
        });
    }
    Ok(())
}

pub trait Thumbnailer: Send + Sync {
    /// Returns PNG-encoded bytes that fit within `size`x`size`. With `pad`,
    /// the image is centred on a transparent square of exactly that size.
    fn create_thumbnail(&self, path: &Path, size: u32, pad: bool) -> Result<Vec<u8>, AssistError>;
}

pub struct ImageThumbnailer;

impl Thumbnailer for ImageThumbnailer {
    fn create_thumbnail(&self, path: &Path, size: u32, pad: bool) -> Result<Vec<u8>, AssistError> {
        let original = image::io::Reader::open(path)?
            .with_guessed_format()?
            .decode()?;
        debug!(
            "Creating thumbnail of {} ({}x{})",
            path.display(),
            original.width(),
            original.height()
        );

        // Shrink only; small images keep their size.
        let resized = if original.width() > size || original.height() > size {
            original.resize(size, size, FilterType::Lanczos3)
        } else {
            original
        };

        let thumbnail = if pad {
            let mut canvas = RgbaImage::new(size, size);
            let x = (size - resized.width()) / 2;
            let y = (size - resized.height()) / 2;
            imageops::overlay(&mut canvas, &resized.to_rgba8(), x as i64, y as i64);
            DynamicImage::ImageRgba8(canvas)
        } else {
            resized
        };

        let mut bytes: Vec<u8> = Vec::new();
        thumbnail.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Avatar files live under `<media_path>/avatars`; profiles store names
/// relative to that directory.
#[derive(Clone)]
pub struct AvatarStorage {
    root: PathBuf,
}

impl AvatarStorage {
    pub fn new(media_path: &Path) -> Self {
        Self {
            root: media_path.join("avatars"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    pub fn save(&self, name: &str, content: &[u8]) -> Result<(), AssistError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path(name), content)?;
        Ok(())
    }

    /// Removing a file that is already gone is not an error.
    pub fn delete(&self, name: &str) -> Result<(), AssistError> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("Avatar {name} was already deleted");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn upload_name(file_name: &str) -> String {
        let sanitized: String = Path::new(file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("avatar")
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}-{}", Uuid::new_v4().simple(), sanitized)
    }
}

/// Replaces the avatar of `profile` with a padded PNG thumbnail of
/// `upload`. The caller persists the profile. If the thumbnail cannot be
/// made, the previous avatar is left untouched.
pub fn replace_avatar(
    storage: &AvatarStorage,
    thumbnailer: &dyn Thumbnailer,
    profile: &mut Profile,
    upload: &UploadedFile,
    size: u32,
) -> Result<(), AssistError> {
    let uploaded_name = AvatarStorage::upload_name(&upload.file_name);
    storage.save(&uploaded_name, &upload.data)?;
    let thumbnail = thumbnailer.create_thumbnail(&storage.path(&uploaded_name), size, true);
    storage.delete(&uploaded_name)?;
    let content = thumbnail?;

    let name = format!("{uploaded_name}.png");
    storage.save(&name, &content)?;
    info!("Stored avatar {name} for user {}", profile.user_id);

    if let Some(old_name) = profile.avatar.replace(name) {
        if storage.exists(&old_name) {
            storage.delete(&old_name)?;
        }
    }
    Ok(())
}

pub fn delete_avatar(storage: &AvatarStorage, profile: &mut Profile) -> Result<(), AssistError> {
    if let Some(name) = profile.avatar.take() {
        storage.delete(&name)?;
    }
    Ok(())
}
