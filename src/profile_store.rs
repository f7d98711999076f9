use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::recipe::{Recipe, RecipeRequest, RecipeSource, Recommendation};

pub const DEFAULT_DATA_FILE: &str = ".recipe_buddy_data/users.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub created_at: DateTime<Utc>,
    pub request: RecipeRequest,
    pub source: RecipeSource,
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Profile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub pantry: BTreeSet<String>,
    #[serde(default)]
    pub preferences: BTreeSet<String>,
    #[serde(default)]
    pub allergies: BTreeSet<String>,
    #[serde(default)]
    pub constraints: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

fn to_clean_set<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Profile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn set_pantry<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pantry = to_clean_set(items);
    }

    pub fn add_to_pantry<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pantry.extend(to_clean_set(items));
    }

    pub fn set_preferences<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.preferences = to_clean_set(items);
    }

    pub fn set_allergies<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allergies = to_clean_set(items);
    }

    pub fn set_constraints(&mut self, constraints: &str) {
        self.constraints = constraints.trim().to_string();
    }

    pub fn record(&mut self, request: RecipeRequest, recommendation: &Recommendation) {
        self.history.push(HistoryEntry {
            created_at: Utc::now(),
            request,
            source: recommendation.source,
            recipes: recommendation.recipes.clone(),
        });
    }
}

/// Username -> profile mapping persisted as one pretty-printed JSON object.
///
/// There is no file locking: a single writer process is assumed.
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: BTreeMap<String, Profile>,
}

/// Strings from a JSON array, ignoring anything that is not a string.
fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Rebuilds a profile field by field from an entry that does not match [`Profile`] exactly.
/// Also reads the older `{"profile": {"diet": [...], "allergies": [...]}}` layout.
fn salvage_profile(username: &str, entry: &Map<String, Value>) -> Profile {
    let nested = entry.get("profile").and_then(Value::as_object);
    let nested_field = |key: &str| nested.and_then(|n| n.get(key));

    let mut profile = Profile::new(username);
    profile.set_pantry(string_items(entry.get("pantry")));
    profile.set_preferences(string_items(
        entry.get("preferences").or_else(|| nested_field("diet")),
    ));
    profile.set_allergies(string_items(
        entry.get("allergies").or_else(|| nested_field("allergies")),
    ));
    if let Some(constraints) = entry.get("constraints").and_then(Value::as_str) {
        profile.set_constraints(constraints);
    }
    let history = entry.get("history").and_then(Value::as_array);
    let mut dropped = 0;
    for item in history.into_iter().flatten() {
        match serde_json::from_value::<HistoryEntry>(item.clone()) {
            Ok(history_entry) => profile.history.push(history_entry),
            Err(_) => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!(username, dropped, "unreadable history entries skipped");
    }
    profile
}

fn profiles_from_entries(path: &Path, entries: Map<String, Value>) -> BTreeMap<String, Profile> {
    let mut profiles = BTreeMap::new();
    for (name, value) in entries {
        let Some(entry) = value.as_object() else {
            warn!(path = %path.display(), username = %name, "profile entry is not an object, skipped");
            continue;
        };
        let profile = if entry.contains_key("profile") {
            debug!(username = %name, "reading older profile layout");
            salvage_profile(&name, entry)
        } else {
            match serde_json::from_value::<Profile>(value.clone()) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(path = %path.display(), username = %name, error = %e, "profile entry recovered field by field");
                    salvage_profile(&name, entry)
                }
            }
        };
        profiles.insert(name, profile);
    }
    // The map key is authoritative for the username.
    for (name, profile) in profiles.iter_mut() {
        profile.username = name.clone();
    }
    profiles
}

impl ProfileStore {
    /// Loads the store at `path`. A missing or unreadable file yields an empty store.
    ///
    /// Entries are read one by one, so a single malformed profile never hides the others.
    /// A file that is not a JSON object at all is copied to `<path>.corrupt` before starting empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let profiles = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(entries) => profiles_from_entries(&path, entries),
                Err(e) => {
                    let backup = path.with_extension("json.corrupt");
                    match fs::copy(&path, &backup) {
                        Ok(_) => warn!(path = %path.display(), backup = %backup.display(), error = %e, "profile store is corrupt, starting empty"),
                        Err(copy_err) => warn!(path = %path.display(), error = %e, backup_error = %copy_err, "profile store is corrupt and could not be backed up, starting empty"),
                    }
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no profile store yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "profile store unreadable, starting empty");
                BTreeMap::new()
            }
        };
        info!(path = %path.display(), profiles = profiles.len(), "profile store loaded");
        Self { path, profiles }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn get(&self, username: &str) -> Option<&Profile> {
        self.profiles.get(username)
    }

    pub fn get_mut(&mut self, username: &str) -> Option<&mut Profile> {
        self.profiles.get_mut(username)
    }

    /// Returns the profile for `username`, creating an empty one on first login.
    pub fn get_or_create(&mut self, username: &str) -> &mut Profile {
        self.profiles.entry(username.to_string()).or_insert_with(|| {
            info!(username, "creating profile");
            Profile::new(username)
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.profiles).context("Failed to serialize profile store")
    }

    /// Writes the whole mapping to a temporary sibling file, then renames it into place.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory {:?}", parent)
                })?;
            }
        }
        let json = self.to_json()?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write profile store to {:?}", tmp_path))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to move profile store into {:?}", self.path))?;
        debug!(path = %self.path.display(), profiles = self.profiles.len(), "profile store saved");
        Ok(())
    }
}
