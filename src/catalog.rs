//! Portfolio content: what each page shows and where its assets live.
//!
//! The catalog is authored as JSON and embedded at build time. Parsing
//! rejects missing or unknown fields; [`Catalog::from_json`] then checks the
//! values themselves so an authoring slip surfaces as a [`CatalogError`]
//! instead of a blank card.

use serde::Deserialize;
use thiserror::Error;

use crate::media::{classify, MediaKind};
use crate::viewer::{FileSetError, ScriptFileSet};

/// Prefix for every public asset URL. Empty when the app is served from `/`.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub const PUBLIC_ROOT: &str = "";

const EMBEDDED_CATALOG: &str = include_str!("../content/catalog.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{section} entry {index} has an empty `{field}`")]
    MissingText {
        section: &'static str,
        index: usize,
        field: &'static str,
    },
    #[error("{section} entry {name:?} uses unsupported media {media:?}")]
    UnsupportedMedia {
        section: &'static str,
        name: String,
        media: String,
    },
    #[error("{section} entry {name:?} uses media {media:?} that needs a {expected}")]
    MediaKindMismatch {
        section: &'static str,
        name: String,
        media: String,
        expected: &'static str,
    },
    #[error("script {name:?} has an invalid code folder {folder:?}")]
    InvalidFolder { name: String, folder: String },
    #[error("script {name:?} has an invalid file list: {source}")]
    Files {
        name: String,
        #[source]
        source: FileSetError,
    },
    #[error("{section} lists {name:?} more than once")]
    DuplicateName { section: &'static str, name: String },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    owner: String,
    source_url: String,
    bio: Vec<String>,
    scripts: Vec<RawScript>,
    projects: Vec<RawProject>,
    animations: RawAnimations,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScript {
    name: String,
    description: String,
    media: String,
    code_folder: String,
    files: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProject {
    name: String,
    description: String,
    media: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnimations {
    intro: String,
    clips: Vec<RawClip>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClip {
    media: String,
    caption: String,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, PartialEq, Debug)]
pub struct ScriptPreview {
    pub name: String,
    pub description: String,
    pub media: String,
    pub code_folder: String,
    pub files: ScriptFileSet,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl ScriptPreview {
    pub fn media_url(&self) -> String {
        media_url(&self.media)
    }

    pub fn code_base_path(&self) -> String {
        format!("{PUBLIC_ROOT}/code/{}", self.code_folder)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, PartialEq, Debug)]
pub struct ProjectPreview {
    pub name: String,
    pub description: String,
    pub media: String,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl ProjectPreview {
    pub fn media_url(&self) -> String {
        media_url(&self.media)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, PartialEq, Debug)]
pub struct AnimationClip {
    pub media: String,
    pub caption: String,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl AnimationClip {
    pub fn media_url(&self) -> String {
        media_url(&self.media)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, PartialEq, Debug)]
pub struct Catalog {
    pub owner: String,
    pub source_url: String,
    pub bio: Vec<String>,
    pub scripts: Vec<ScriptPreview>,
    pub projects: Vec<ProjectPreview>,
    pub animation_intro: String,
    pub animations: Vec<AnimationClip>,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub fn media_url(file: &str) -> String {
    format!("{PUBLIC_ROOT}/{}", media_path(file))
}

fn media_path(file: &str) -> String {
    format!("media/{}", file.trim_start_matches('/'))
}

pub fn load() -> Result<Catalog, CatalogError> {
    Catalog::from_json(EMBEDDED_CATALOG)
}

impl Catalog {
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(raw)?;

        require_text("catalog", 0, "owner", &raw.owner)?;
        require_text("catalog", 0, "source_url", &raw.source_url)?;
        for (index, paragraph) in raw.bio.iter().enumerate() {
            require_text("bio", index, "paragraph", paragraph)?;
        }

        let mut scripts = Vec::with_capacity(raw.scripts.len());
        for (index, script) in raw.scripts.into_iter().enumerate() {
            scripts.push(validate_script(index, script)?);
        }
        ensure_unique("scripts", scripts.iter().map(|script| script.name.as_str()))?;

        let mut projects = Vec::with_capacity(raw.projects.len());
        for (index, project) in raw.projects.into_iter().enumerate() {
            require_text("projects", index, "name", &project.name)?;
            require_text("projects", index, "description", &project.description)?;
            require_media("projects", &project.name, &project.media, None)?;
            projects.push(ProjectPreview {
                name: project.name,
                description: project.description,
                media: project.media,
            });
        }
        ensure_unique("projects", projects.iter().map(|project| project.name.as_str()))?;

        require_text("animations", 0, "intro", &raw.animations.intro)?;
        let mut animations = Vec::with_capacity(raw.animations.clips.len());
        for (index, clip) in raw.animations.clips.into_iter().enumerate() {
            require_text("animations", index, "caption", &clip.caption)?;
            require_media("animations", &clip.caption, &clip.media, Some(MediaKind::Video))?;
            animations.push(AnimationClip {
                media: clip.media,
                caption: clip.caption,
            });
        }

        Ok(Self {
            owner: raw.owner,
            source_url: raw.source_url,
            bio: raw.bio,
            scripts,
            projects,
            animation_intro: raw.animations.intro,
            animations,
        })
    }

    /// Asset paths relative to the public root, e.g. `media/Clip.mp4` or
    /// `code/ElementsGame/TriggerCast.lua`.
    pub fn asset_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();

        for script in &self.scripts {
            paths.push(media_path(&script.media));
            for file in script.files.iter() {
                paths.push(format!("code/{}/{file}", script.code_folder));
            }
        }
        paths.extend(self.projects.iter().map(|project| media_path(&project.media)));
        paths.extend(self.animations.iter().map(|clip| media_path(&clip.media)));

        paths
    }
}

fn validate_script(index: usize, script: RawScript) -> Result<ScriptPreview, CatalogError> {
    require_text("scripts", index, "name", &script.name)?;
    require_text("scripts", index, "description", &script.description)?;
    require_text("scripts", index, "code_folder", &script.code_folder)?;
    require_media("scripts", &script.name, &script.media, None)?;

    let folder = script.code_folder.trim();
    if folder.contains(['/', '\\']) || folder == ".." || folder == "." {
        return Err(CatalogError::InvalidFolder {
            name: script.name,
            folder: script.code_folder,
        });
    }

    let files = ScriptFileSet::new(script.files).map_err(|source| CatalogError::Files {
        name: script.name.clone(),
        source,
    })?;

    Ok(ScriptPreview {
        code_folder: folder.to_string(),
        name: script.name,
        description: script.description,
        media: script.media,
        files,
    })
}

fn require_text(section: &'static str, index: usize, field: &'static str, value: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::MissingText { section, index, field });
    }
    Ok(())
}

fn require_media(
    section: &'static str,
    name: &str,
    media: &str,
    expected: Option<MediaKind>,
) -> Result<(), CatalogError> {
    let Some(kind) = classify(media) else {
        return Err(CatalogError::UnsupportedMedia {
            section,
            name: name.to_string(),
            media: media.to_string(),
        });
    };

    match expected {
        Some(expected) if expected != kind => Err(CatalogError::MediaKindMismatch {
            section,
            name: name.to_string(),
            media: media.to_string(),
            expected: match expected {
                MediaKind::Video => "video",
                MediaKind::Image => "image",
            },
        }),
        _ => Ok(()),
    }
}

fn ensure_unique<'a>(section: &'static str, names: impl Iterator<Item = &'a str>) -> Result<(), CatalogError> {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CatalogError::DuplicateName {
                section,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
