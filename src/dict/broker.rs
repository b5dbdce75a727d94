use super::{DictResult, Dictionary, DictionaryError, FstDictionary, PwlDictionary};
use crate::error::{Error, Result};
use crate::tokenize::registry::{candidates, normalize_tag};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

type SharedDict = Rc<RefCell<Box<dyn Dictionary>>>;

/// Creates a fresh dictionary for a registered tag.
pub type DictFactory = Rc<dyn Fn(&str) -> DictResult<Box<dyn Dictionary>>>;

/// Resolves language tags to dictionaries.
///
/// Dictionaries come from `<tag>.dict` files in the data directories or from
/// factories registered in memory. A tag resolves like a tokenizer does: the
/// full tag first, then its base subtag. While any handle for a tag is alive,
/// further requests share the same loaded dictionary.
pub struct Broker {
    data_dirs: Vec<PathBuf>,
    factories: HashMap<String, DictFactory>,
    loaded: RefCell<HashMap<String, Weak<RefCell<Box<dyn Dictionary>>>>>,
    alive: Rc<()>,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl Broker {
    /// A broker reading the default data directory.
    pub fn new() -> Self {
        let mut broker = Self::empty();
        if let Some(dir) = crate::config::Config::data_dir() {
            broker.data_dirs.push(dir);
        }
        broker
    }

    /// A broker with no dictionaries at all.
    pub fn empty() -> Self {
        Self {
            data_dirs: Vec::new(),
            factories: HashMap::new(),
            loaded: RefCell::new(HashMap::new()),
            alive: Rc::new(()),
        }
    }

    /// Also look for `.dict` files in `dir`, ahead of the directories already
    /// known.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dirs.insert(0, dir.into());
        self
    }

    pub fn register(&mut self, tag: &str, factory: DictFactory) {
        self.factories.insert(normalize_tag(tag), factory);
    }

    /// Register a fixed in-memory word list for `tag`.
    pub fn register_words(&mut self, tag: &str, words: &[&str]) {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        self.register(
            tag,
            Rc::new(move |tag| Ok(Box::new(FstDictionary::from_words(tag, &words)?) as Box<dyn Dictionary>)),
        );
    }

    fn dict_path(&self, tag: &str) -> Option<PathBuf> {
        self.data_dirs
            .iter()
            .map(|dir| dir.join(format!("{}.dict", tag)))
            .find(|path| path.is_file())
    }

    fn provides(&self, tag: &str) -> bool {
        self.factories.contains_key(tag) || self.dict_path(tag).is_some()
    }

    /// The tag that would actually be loaded for `tag`.
    fn resolve(&self, tag: &str) -> Option<String> {
        candidates(tag, None).into_iter().find(|candidate| self.provides(candidate))
    }

    pub fn dict_exists(&self, tag: &str) -> bool {
        self.resolve(tag).is_some()
    }

    /// Every tag a dictionary can be requested for.
    pub fn list_languages(&self) -> Vec<String> {
        let mut tags: BTreeSet<String> = self.factories.keys().cloned().collect();
        for dir in &self.data_dirs {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for path in entries.flatten().map(|entry| entry.path()) {
                if path.extension().and_then(|e| e.to_str()) == Some("dict") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        tags.insert(stem.to_string());
                    }
                }
            }
        }
        tags.into_iter().collect()
    }

    pub fn request_dict(&self, tag: &str) -> Result<DictHandle> {
        let resolved = self
            .resolve(tag)
            .ok_or_else(|| Error::DictionaryNotFound(tag.to_string()))?;

        if let Some(shared) = self.loaded.borrow().get(&resolved).and_then(Weak::upgrade) {
            log::debug!("reusing loaded dictionary for {}", resolved);
            return Ok(self.handle(&resolved, shared));
        }

        let dict: Box<dyn Dictionary> = match self.factories.get(&resolved) {
            Some(factory) => factory(&resolved)?,
            None => {
                let path = self
                    .dict_path(&resolved)
                    .ok_or_else(|| Error::DictionaryNotFound(tag.to_string()))?;
                Box::new(FstDictionary::open(&resolved, &path)?)
            }
        };
        log::info!("loaded dictionary {} for {}", resolved, tag);

        let shared: SharedDict = Rc::new(RefCell::new(dict));
        self.loaded
            .borrow_mut()
            .insert(resolved.clone(), Rc::downgrade(&shared));
        Ok(self.handle(&resolved, shared))
    }

    /// A personal word list stored at `path`.
    pub fn request_pwl_dict(&self, path: &Path) -> Result<DictHandle> {
        let pwl = PwlDictionary::open(path)?;
        Ok(self.handle("pwl", Rc::new(RefCell::new(Box::new(pwl)))))
    }

    /// Invalidate `handle`. Other handles to the same dictionary keep working.
    pub fn free(&self, handle: &mut DictHandle) {
        handle.dict = None;
        self.loaded
            .borrow_mut()
            .retain(|_, shared| shared.strong_count() > 0);
    }

    fn handle(&self, tag: &str, dict: SharedDict) -> DictHandle {
        DictHandle {
            tag: tag.to_string(),
            dict: Some(dict),
            broker: Rc::downgrade(&self.alive),
        }
    }
}

/// A dictionary handed out by a [`Broker`].
///
/// Every operation fails with [`DictionaryError::Freed`] once the handle was
/// freed or its broker dropped.
pub struct DictHandle {
    tag: String,
    dict: Option<SharedDict>,
    broker: Weak<()>,
}

impl DictHandle {
    pub fn is_live(&self) -> bool {
        self.dict.is_some() && self.broker.strong_count() > 0
    }

    fn shared(&self) -> DictResult<&SharedDict> {
        match &self.dict {
            Some(dict) if self.broker.strong_count() > 0 => Ok(dict),
            _ => Err(DictionaryError::Freed {
                tag: self.tag.clone(),
            }),
        }
    }

    fn get(&self) -> DictResult<Ref<'_, Box<dyn Dictionary>>> {
        Ok(self.shared()?.borrow())
    }

    fn get_mut(&self) -> DictResult<RefMut<'_, Box<dyn Dictionary>>> {
        Ok(self.shared()?.borrow_mut())
    }
}

impl Dictionary for DictHandle {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn check(&self, word: &str) -> DictResult<bool> {
        self.get()?.check(word)
    }

    fn suggest(&self, word: &str) -> DictResult<Vec<String>> {
        self.get()?.suggest(word)
    }

    fn add(&mut self, word: &str) -> DictResult<()> {
        self.get_mut()?.add(word)
    }

    fn add_to_session(&mut self, word: &str) -> DictResult<()> {
        self.get_mut()?.add_to_session(word)
    }

    fn is_added(&self, word: &str) -> DictResult<bool> {
        self.get()?.is_added(word)
    }

    fn remove(&mut self, word: &str) -> DictResult<()> {
        self.get_mut()?.remove(word)
    }

    fn remove_from_session(&mut self, word: &str) -> DictResult<()> {
        self.get_mut()?.remove_from_session(word)
    }

    fn is_removed(&self, word: &str) -> DictResult<bool> {
        self.get()?.is_removed(word)
    }

    fn store_replacement(&mut self, misspelled: &str, corrected: &str) -> DictResult<()> {
        self.get_mut()?.store_replacement(misspelled, corrected)
    }
}

thread_local! {
    static DEFAULT_BROKER: Broker = Broker::new();
}

/// Request a dictionary from this thread's default broker, created on first
/// use.
pub fn default_dict(tag: &str) -> Result<DictHandle> {
    DEFAULT_BROKER.with(|broker| broker.request_dict(tag))
}
