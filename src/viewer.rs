//! State machine behind the "Show Code" modal.
//!
//! The viewer never performs I/O itself. Every transition that needs a
//! network round trip hands back a [`FetchTicket`]; the caller performs the
//! request and reports the outcome through [`ScriptViewer::resolve`], which
//! applies it only when the ticket is still the one the viewer is waiting on.
//! A slow response for a tab the user already left, or for a viewer that was
//! closed in the meantime, is dropped no matter when it arrives.

use thiserror::Error;

use crate::fetch::{script_url, FetchError, FetchState};

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum FileSetError {
    #[error("a script viewer needs at least one file")]
    Empty,
    #[error("script file name at position {index} is blank")]
    BlankName { index: usize },
    #[error("script file name {name:?} must not contain a path separator")]
    NestedPath { name: String },
    #[error("script file name {name:?} must not contain {character:?}")]
    ReservedCharacter { name: String, character: char },
    #[error("script file {name:?} is listed more than once")]
    Duplicate { name: String },
}

/// Ordered, non-empty list of script file names. The first entry is the
/// default tab.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ScriptFileSet(Vec<String>);

impl ScriptFileSet {
    pub fn new<I, S>(names: I) -> Result<Self, FileSetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut files: Vec<String> = Vec::new();

        for (index, name) in names.into_iter().enumerate() {
            let name = name.into().trim().to_string();

            if name.is_empty() {
                return Err(FileSetError::BlankName { index });
            }
            if name.contains(['/', '\\']) {
                return Err(FileSetError::NestedPath { name });
            }
            // These would be read as a query, a fragment or an escape once
            // the name is joined onto the base URL.
            if let Some(character) = name.chars().find(|c| matches!(c, '#' | '?' | '%')) {
                return Err(FileSetError::ReservedCharacter { name, character });
            }
            if files.contains(&name) {
                return Err(FileSetError::Duplicate { name });
            }
            files.push(name);
        }

        if files.is_empty() {
            return Err(FileSetError::Empty);
        }

        Ok(Self(files))
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub fn default_file(&self) -> &str {
        &self.0[0]
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|file| file == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Identity of one fetch request.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FetchTicket {
    pub generation: u64,
    pub filename: String,
    pub url: String,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resolution {
    Applied,
    Discarded,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, PartialEq, Debug)]
pub struct ScriptViewer {
    base_path: String,
    files: ScriptFileSet,
    active: usize,
    visible: bool,
    fetch: FetchState,
    generation: u64,
    pending: Option<FetchTicket>,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl ScriptViewer {
    pub fn new(base_path: impl Into<String>, files: ScriptFileSet) -> Self {
        Self {
            base_path: base_path.into(),
            files,
            active: 0,
            visible: false,
            fetch: FetchState::Idle,
            generation: 0,
            pending: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn files(&self) -> &ScriptFileSet {
        &self.files
    }

    pub fn active_file(&self) -> &str {
        &self.files.0[self.active]
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    pub fn pending(&self) -> Option<&FetchTicket> {
        self.pending.as_ref()
    }

    /// Opening an already open viewer changes nothing and issues no request.
    pub fn open(&mut self) -> Option<FetchTicket> {
        if self.visible {
            return None;
        }

        self.visible = true;
        self.active = 0;
        Some(self.issue())
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.fetch = FetchState::Idle;
        self.pending = None;
        self.generation += 1;
    }

    pub fn select(&mut self, filename: &str) -> Option<FetchTicket> {
        if !self.visible {
            return None;
        }

        let index = self.files.position(filename)?;
        if index == self.active {
            return None;
        }

        self.active = index;
        Some(self.issue())
    }

    /// Re-requests the active tab after a failure.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        if !self.visible || !matches!(self.fetch, FetchState::Failed(_)) {
            return None;
        }

        Some(self.issue())
    }

    pub fn resolve(&mut self, ticket: &FetchTicket, outcome: Result<String, FetchError>) -> Resolution {
        if self.pending.as_ref() != Some(ticket) {
            return Resolution::Discarded;
        }

        self.pending = None;
        self.fetch = match outcome {
            Ok(content) => FetchState::Loaded(content),
            Err(error) => FetchState::Failed(error.to_string()),
        };
        Resolution::Applied
    }

    fn issue(&mut self) -> FetchTicket {
        self.generation += 1;

        let filename = self.active_file().to_string();
        let ticket = FetchTicket {
            generation: self.generation,
            url: script_url(&self.base_path, &filename),
            filename,
        };

        self.fetch = FetchState::Loading;
        self.pending = Some(ticket.clone());
        ticket
    }
}
