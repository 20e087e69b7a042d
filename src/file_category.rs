/// File categorization by extension.
///
/// Categories and their extensions form a fixed, ordered table. A file name is
/// classified by its final extension, compared case-insensitively.
///
/// # Examples
///
/// ```
/// use filesorter::file_category::{Category, FileMapper};
///
/// let mapper = FileMapper::default();
/// assert_eq!(mapper.categorize("holiday.JPG"), Some(Category::Images));
/// assert_eq!(mapper.categorize("song.mp3"), Some(Category::Audios));
/// assert_eq!(mapper.categorize("README"), None);
/// ```
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// A named bucket of extensions sharing a destination subfolder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    /// jpg, jpeg, png, webp
    Images,
    /// pdf, docx, txt, zip
    Documents,
    /// mp3, wav, m4a
    Audios,
    /// mp4, mov, avi
    Videos,
}

impl Category {
    /// All categories in table order.
    pub const ALL: [Category; 4] = [
        Category::Images,
        Category::Documents,
        Category::Audios,
        Category::Videos,
    ];

    /// Returns the subdirectory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use filesorter::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::Audios.dir_name(), "Audios");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Audios => "Audios",
            Category::Videos => "Videos",
        }
    }

    /// Lowercase extensions (without the leading dot) that belong to this category.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Images => &["jpg", "jpeg", "png", "webp"],
            Category::Documents => &["pdf", "docx", "txt", "zip"],
            Category::Audios => &["mp3", "wav", "m4a"],
            Category::Videos => &["mp4", "mov", "avi"],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Maps file extensions to categories.
///
/// Built once from the category table. When an extension appears under more
/// than one category, the first category in table order keeps it.
#[derive(Debug, Clone)]
pub struct FileMapper {
    extension_map: HashMap<String, Category>,
}

impl FileMapper {
    /// Creates a new `FileMapper` from the fixed category table.
    pub fn new() -> Self {
        let mut extension_map = HashMap::new();
        for category in Category::ALL {
            for ext in category.extensions() {
                extension_map.entry(ext.to_string()).or_insert(category);
            }
        }
        Self { extension_map }
    }

    /// Maps a bare extension (no dot) to a category.
    ///
    /// # Examples
    ///
    /// ```
    /// use filesorter::file_category::{Category, FileMapper};
    ///
    /// let mapper = FileMapper::default();
    /// assert_eq!(mapper.extension_to_category("PDF"), Some(Category::Documents));
    /// assert_eq!(mapper.extension_to_category("flac"), None);
    /// ```
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(&ext.to_lowercase()).copied()
    }

    /// Classifies a file name, returning `None` when it is unclassified.
    ///
    /// Only the final extension counts, so `backup.tar.zip` is a document and
    /// `archive.tar.gz` is unclassified. Names with no extension, including
    /// dot-files such as `.png`, are unclassified.
    pub fn categorize(&self, file_name: &str) -> Option<Category> {
        Path::new(file_name)
            .extension()
            .and_then(|ext| self.extension_to_category(&ext.to_string_lossy()))
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_dir_names() {
        assert_eq!(Category::Images.dir_name(), "Images");
        assert_eq!(Category::Documents.dir_name(), "Documents");
        assert_eq!(Category::Audios.dir_name(), "Audios");
        assert_eq!(Category::Videos.dir_name(), "Videos");
    }

    #[test]
    fn test_every_table_extension_classifies_in_any_case() {
        let mapper = FileMapper::default();
        for category in Category::ALL {
            for ext in category.extensions() {
                assert_eq!(mapper.categorize(&format!("file.{}", ext)), Some(category));
                assert_eq!(
                    mapper.categorize(&format!("FILE.{}", ext.to_uppercase())),
                    Some(category)
                );
            }
        }
        assert_eq!(mapper.categorize("Mixed.JpEg"), Some(Category::Images));
    }

    #[test]
    fn test_unlisted_extension_is_unclassified() {
        let mapper = FileMapper::default();
        assert_eq!(mapper.categorize("song.flac"), None);
        assert_eq!(mapper.categorize("archive.tar.gz"), None);
        assert_eq!(mapper.categorize("notes.txt.bak"), None);
    }

    #[test]
    fn test_missing_extension_is_unclassified() {
        let mapper = FileMapper::default();
        assert_eq!(mapper.categorize("Makefile"), None);
        assert_eq!(mapper.categorize("trailing."), None);
        assert_eq!(mapper.categorize(".png"), None);
        assert_eq!(mapper.categorize(""), None);
    }

    #[test]
    fn test_only_last_extension_counts() {
        let mapper = FileMapper::default();
        assert_eq!(mapper.categorize("photo.png.txt"), Some(Category::Documents));
        assert_eq!(mapper.categorize("my.holiday.video.MOV"), Some(Category::Videos));
    }

    #[test]
    fn test_extensions_are_disjoint() {
        let mut seen = std::collections::HashSet::new();
        for category in Category::ALL {
            for ext in category.extensions() {
                assert!(seen.insert(*ext), "extension {} listed twice", ext);
            }
        }
    }
}
