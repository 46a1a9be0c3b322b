//! Reference images for UI landmarks.

use super::error::AssetError;
use image::GrayImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A named reference image, e.g. `btn_solo.png`.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    name: String,
    image: GrayImage,
}

impl Template {
    pub fn new(name: impl Into<String>, image: GrayImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Templates keyed by name.
///
/// Every template a state graph refers to is loaded up front, so a missing
/// asset surfaces before navigation starts rather than on first use.
#[derive(Clone, Debug, Default)]
pub struct TemplateLibrary {
    templates: HashMap<String, Template>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from in-memory templates.
    pub fn from_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let mut library = Self::new();
        for template in templates {
            library.insert(template);
        }
        library
    }

    /// Load `names` from `dir`, where each name is a file name inside it.
    pub fn load_all<S: AsRef<str>>(dir: impl AsRef<Path>, names: &[S]) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        let mut library = Self::new();
        for name in names {
            let name = name.as_ref();
            if library.contains(name) {
                continue;
            }
            library.load_file(name, dir.join(name))?;
        }
        info!(count = library.len(), dir = %dir.display(), "templates loaded");
        Ok(library)
    }

    /// Load a single template from `path` under `name`.
    pub fn load_file(&mut self, name: &str, path: impl Into<PathBuf>) -> Result<(), AssetError> {
        let path = path.into();
        if !path.exists() {
            return Err(AssetError::FileNotFound { path });
        }
        let image = image::open(&path).map_err(|e| AssetError::Decode {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let template = Template::new(name, image.to_luma8());
        debug!(
            template = name,
            width = template.dimensions().0,
            height = template.dimensions().1,
            "loaded template"
        );
        self.insert(template);
        Ok(())
    }

    /// Add or replace a template.
    pub fn insert(&mut self, template: Template) -> Option<Template> {
        self.templates.insert(template.name.clone(), template)
    }

    pub fn get(&self, name: &str) -> Result<&Template, AssetError> {
        self.templates
            .get(name)
            .ok_or_else(|| AssetError::MissingTemplate {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Names from `required` that are not loaded.
    pub fn missing<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        required
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn patch(name: &str, level: u8) -> Template {
        Template::new(name, GrayImage::from_pixel(4, 3, Luma([level])))
    }

    #[test]
    fn get_returns_inserted_template() {
        let library = TemplateLibrary::from_templates([patch("btn_play.png", 9)]);

        let template = library.get("btn_play.png").unwrap();
        assert_eq!(template.name(), "btn_play.png");
        assert_eq!(template.dimensions(), (4, 3));
    }

    #[test]
    fn get_unknown_template_is_missing() {
        let library = TemplateLibrary::new();
        assert!(matches!(
            library.get("btn_solo.png"),
            Err(AssetError::MissingTemplate { name }) if name == "btn_solo.png"
        ));
    }

    #[test]
    fn missing_lists_unloaded_names() {
        let library = TemplateLibrary::from_templates([patch("a.png", 1)]);
        assert_eq!(library.missing(&["a.png", "b.png"]), vec!["b.png".to_string()]);
    }

    #[test]
    fn load_all_reads_files_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        GrayImage::from_pixel(5, 5, Luma([200]))
            .save(dir.path().join("btn_train.png"))
            .unwrap();

        let library = TemplateLibrary::load_all(dir.path(), &["btn_train.png"]).unwrap();

        assert_eq!(library.len(), 1);
        assert_eq!(library.get("btn_train.png").unwrap().dimensions(), (5, 5));
    }

    #[test]
    fn load_all_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TemplateLibrary::load_all(dir.path(), &["btn_level.png"]);
        assert!(matches!(result, Err(AssetError::FileNotFound { .. })));
    }
}
