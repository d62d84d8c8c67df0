use std::fs::{self, File};
use std::io::Write as _;
use std::ops::Range;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::{ENTRY_SEPARATOR, PADDED_SEPARATOR};
use crate::core_api::{CoreError, CoreErrorCode};

// Prepended on load so the first record is framed like every other one.
const SENTINEL: char = ' ';
const TEMP_EXTENSION: &str = "tmp";

/// The save file and the sibling it is staged through while persisting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFiles {
    pub path: PathBuf,
    pub temp_path: PathBuf,
}

impl SaveFiles {
    pub fn new(path: impl Into<PathBuf>, temp_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temp_path: temp_path.into(),
        }
    }

    /// Stages through `<file name>.tmp` in the same directory.
    pub fn beside(path: &Path) -> Self {
        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".");
        temp_name.push(TEMP_EXTENSION);
        Self::new(path, path.with_file_name(temp_name))
    }
}

/// The whole save as one text buffer, addressed by specifier.
///
/// Records look like `specifier : value : type`. A value is found by searching
/// for `" " + specifier + " : "` and reading up to the next `" : "`, which is
/// what keeps `5hp` from matching inside `15hp`.
#[derive(Debug, Clone)]
pub struct SaveDocument {
    text: String,
    files: Option<SaveFiles>,
    modified: bool,
}

impl SaveDocument {
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        Self::open_files(SaveFiles::beside(path))
    }

    pub fn open_files(files: SaveFiles) -> Result<Self, CoreError> {
        let contents =
            fs::read_to_string(&files.path).map_err(|e| CoreError::io_at("read", &files.path, e))?;
        debug!(path = %files.path.display(), bytes = contents.len(), "loaded save document");

        let mut document = Self::from_text(&contents);
        document.files = Some(files);
        Ok(document)
    }

    /// In-memory document with no backing file; `persist` will fail.
    pub fn from_text(contents: &str) -> Self {
        let mut text = String::with_capacity(contents.len() + 1);
        text.push(SENTINEL);
        text.push_str(contents);
        Self {
            text,
            files: None,
            modified: false,
        }
    }

    pub fn files(&self) -> Option<&SaveFiles> {
        self.files.as_ref()
    }

    /// File contents as they would be written, without the sentinel.
    pub fn text(&self) -> &str {
        &self.text[SENTINEL.len_utf8()..]
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn contains(&self, specifier: &str) -> bool {
        self.value_range(specifier).is_some()
    }

    pub fn find(&self, specifier: &str) -> Option<&str> {
        self.value_range(specifier).map(|range| &self.text[range])
    }

    /// Value stored under `specifier`, or an empty string when the save has no
    /// such record.
    pub fn get(&self, specifier: &str) -> String {
        self.find(specifier).unwrap_or_default().to_string()
    }

    /// Replaces the value of `specifier`, provided it currently equals
    /// `old_value`. The buffer is untouched on error.
    pub fn set(
        &mut self,
        specifier: &str,
        old_value: &str,
        new_value: &str,
    ) -> Result<(), CoreError> {
        if !is_encodable(new_value) {
            return Err(CoreError::new(
                CoreErrorCode::InvalidValue,
                format!("value {new_value:?} for {specifier} would break record framing"),
            ));
        }

        let Some(range) = self.value_range(specifier) else {
            return Err(CoreError::new(
                CoreErrorCode::FieldNotFound,
                format!("no record for {specifier}"),
            ));
        };

        let stored = &self.text[range.clone()];
        if stored != old_value {
            return Err(CoreError::new(
                CoreErrorCode::ValueMismatch,
                format!("{specifier}: expected {old_value:?}, found {stored:?}"),
            ));
        }

        self.text.replace_range(range, new_value);
        self.modified = true;
        Ok(())
    }

    /// Applies every `(specifier, old, new)` edit or none of them.
    pub fn set_many<'a, I>(&mut self, edits: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        let mut staged = Self {
            text: self.text.clone(),
            files: None,
            modified: false,
        };
        for (specifier, old_value, new_value) in edits {
            staged.set(specifier, old_value, new_value)?;
        }

        if staged.modified {
            self.text = staged.text;
            self.modified = true;
        }
        Ok(())
    }

    /// Writes the buffer to the temp sibling, then renames it over the save.
    pub fn persist(&mut self) -> Result<(), CoreError> {
        let Some(files) = self.files.as_ref() else {
            return Err(CoreError::new(
                CoreErrorCode::Io,
                "document has no backing file to persist to",
            ));
        };

        write_temp(&files.temp_path, self.text().as_bytes())?;
        fs::rename(&files.temp_path, &files.path).map_err(|e| {
            let _ = fs::remove_file(&files.temp_path);
            CoreError::io_at("replace", &files.path, e)
        })?;

        info!(path = %files.path.display(), bytes = self.text().len(), "saved player data");
        self.modified = false;
        Ok(())
    }

    fn value_range(&self, specifier: &str) -> Option<Range<usize>> {
        let start_delimiter = format!("{SENTINEL}{specifier}{PADDED_SEPARATOR}");
        let start = self.text.find(&start_delimiter)? + start_delimiter.len();
        let end = self.text[start..]
            .find(PADDED_SEPARATOR)
            .map_or(self.text.len(), |offset| start + offset);
        Some(start..end)
    }
}

// A value is safe to store when, framed as a record, it neither closes early
// nor opens a record of its own.
fn is_encodable(value: &str) -> bool {
    let framed = format!("{SENTINEL}{value}{PADDED_SEPARATOR}");
    if framed.find(PADDED_SEPARATOR) != Some(framed.len() - PADDED_SEPARATOR.len())
        || framed.contains(ENTRY_SEPARATOR)
    {
        return false;
    }
    // A trailing word after a space would be framed like a specifier.
    !matches!(value.rsplit_once(SENTINEL), Some((_, last_word)) if !last_word.is_empty())
}

fn write_temp(temp_path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let mut file = File::create(temp_path).map_err(|e| CoreError::io_at("create", temp_path, e))?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(temp_path);
            CoreError::io_at("write", temp_path, e)
        })
}
