// i18n.rs — runtime UI strings
//
// Tables are flat JSON objects `{ "key": "text" }` stored as
// assets/i18n/<lang>.json, looked up next to the executable first and then in
// the working directory. English is compiled in and is always the fallback.
// `{name}` placeholders are filled by `tr_with`.

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const FALLBACK_LANG: &str = "en";

const BUILTIN_EN: &str = include_str!("../assets/i18n/en.json");

/// Languages offered in the UI: (code, native name).
pub const LANGUAGES: [(&str, &str); 4] = [
    ("en", "English"),
    ("zh-Hans", "简体中文"),
    ("ja", "日本語"),
    ("fr", "Français"),
];

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    lang: String,
    strings: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Catalog {
    pub fn new(lang: impl Into<String>, strings: HashMap<String, String>) -> Self {
        Self {
            lang: lang.into(),
            strings,
            fallback: builtin_fallback(),
        }
    }

    /// Load `lang` from disk; unknown languages fall back to English entirely.
    pub fn load(lang: &str) -> Self {
        let strings = if lang == FALLBACK_LANG {
            HashMap::new()
        } else {
            match find_table(lang).map(|p| read_table(&p)) {
                Some(Ok(map)) => map,
                Some(Err(e)) => {
                    log::warn!("ignoring broken string table for {lang}: {e}");
                    HashMap::new()
                }
                None => {
                    log::warn!("no string table for {lang}, using {FALLBACK_LANG}");
                    HashMap::new()
                }
            }
        };
        Self::new(lang, strings)
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Missing keys come back unchanged.
    pub fn get(&self, key: &str) -> String {
        self.strings
            .get(key)
            .or_else(|| self.fallback.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn get_with(&self, key: &str, args: &[(&str, String)]) -> String {
        args.iter().fold(self.get(key), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }
}

fn builtin_fallback() -> HashMap<String, String> {
    serde_json::from_str(BUILTIN_EN).unwrap_or_default()
}

fn read_table(path: &Path) -> Result<HashMap<String, String>, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

fn find_table(lang: &str) -> Option<PathBuf> {
    let rel = PathBuf::from("assets").join("i18n").join(format!("{lang}.json"));

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&rel)));

    beside_exe
        .into_iter()
        .chain(std::iter::once(rel.clone()))
        .find(|p| p.exists())
}

static CATALOG: OnceCell<RwLock<Catalog>> = OnceCell::new();

/// Switch the global UI language. Safe to call again at runtime.
pub fn init(lang: &str) {
    let catalog = Catalog::load(lang);
    log::info!("ui language: {}", catalog.lang());
    match CATALOG.get() {
        Some(lock) => {
            if let Ok(mut current) = lock.write() {
                *current = catalog;
            }
        }
        None => {
            let _ = CATALOG.set(RwLock::new(catalog));
        }
    }
}

pub fn tr(key: &str) -> String {
    match CATALOG.get().and_then(|l| l.read().ok()) {
        Some(c) => c.get(key),
        None => key.to_string(),
    }
}

pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    match CATALOG.get().and_then(|l| l.read().ok()) {
        Some(c) => c.get_with(key, args),
        None => key.to_string(),
    }
}
