//! Generic parameters functions
//!
//! Parameters are stored as TOML files in the `params` directory under the
//! software root. They can either be loaded directly into a typed structure
//! with [`load`], or loaded as a [`ParamTable`] and queried key by key using
//! a [`ParamKey`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs::read_to_string;
use std::path::PathBuf;
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A '/' separated path to a single parameter, such as
/// `/servo_pid/linear_y/p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamKey {
    segments: Vec<String>,
}

/// A loaded, untyped parameter file which can be queried by [`ParamKey`].
#[derive(Debug, Clone)]
pub struct ParamTable {
    root: toml::Value,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (VIS_SERVO_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ParamKey {
    /// Build a key from a '/' separated prefix. Empty segments (leading,
    /// trailing or repeated slashes) are ignored.
    pub fn new(prefix: &str) -> Self {
        Self {
            segments: split_segments(prefix),
        }
    }

    /// Return a new key with the given suffix appended.
    pub fn join(&self, suffix: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(split_segments(suffix));
        Self { segments }
    }

    /// The individual table names making up the key.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in self.segments.iter() {
            write!(f, "/{}", s)?;
        }
        Ok(())
    }
}

impl ParamTable {
    /// Parse a table from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, LoadError> {
        let root = toml::from_str(text).map_err(LoadError::DeserialiseError)?;
        Ok(Self { root })
    }

    /// Find the raw value stored at the key, if any.
    pub fn lookup(&self, key: &ParamKey) -> Option<&toml::Value> {
        let mut value = &self.root;
        for s in key.segments() {
            value = value.as_table()?.get(s)?;
        }
        Some(value)
    }

    /// Get a real valued parameter. Integer values are accepted.
    ///
    /// Returns `None` if the key is absent. A value of any other type is
    /// reported and treated as absent.
    pub fn get_f64(&self, key: &ParamKey) -> Option<f64> {
        match self.lookup(key)? {
            toml::Value::Float(f) => Some(*f),
            toml::Value::Integer(i) => Some(*i as f64),
            other => {
                warn!(
                    "Parameter {} should be a number, found a {}",
                    key,
                    other.type_str()
                );
                None
            }
        }
    }

    /// Get a parameter of any deserialisable type.
    ///
    /// Returns `None` if the key is absent or the value doesn't match the
    /// expected type (in which case a warning is issued).
    pub fn get<T>(&self, key: &ParamKey) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let value = self.lookup(key)?.clone();
        match value.try_into() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Parameter {} has an unexpected type: {}", key, e);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "params" directory under the software
/// root.
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    let params_str = read_param_file(param_file_path)?;

    // Parse the string into the parameter struct
    toml::from_str(params_str.as_str()).map_err(LoadError::DeserialiseError)
}

/// Load a parameter file as an untyped [`ParamTable`].
///
/// The file path is relative to the "params" directory under the software
/// root.
pub fn load_table(param_file_path: &str) -> Result<ParamTable, LoadError> {
    load::<toml::Value>(param_file_path).map(|root| ParamTable { root })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn params_path(param_file_path: &str) -> Result<PathBuf, LoadError> {
    let mut path = crate::host::get_sw_root().map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);
    Ok(path)
}

fn read_param_file(param_file_path: &str) -> Result<String, LoadError> {
    read_to_string(params_path(param_file_path)?).map_err(LoadError::FileLoadError)
}

fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    const TABLE: &str = r#"
        [object_tracking]
        capture_size_x = 640
        name = "cam0"

        [servo_pid.linear_y]
        p = 1.5
        i_clamp = 2
    "#;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Tracking {
        capture_size_x: u32,
        name: String,
    }

    #[test]
    fn test_key_builder() {
        let prefix = ParamKey::new("/servo_pid/linear_y");
        let key = prefix.join("p");

        assert_eq!(key.segments(), &["servo_pid", "linear_y", "p"]);
        assert_eq!(key.to_string(), "/servo_pid/linear_y/p");
        assert_eq!(ParamKey::new("a//b/").join("/c"), ParamKey::new("a/b/c"));
    }

    #[test]
    fn test_get_f64() {
        let table = ParamTable::from_toml_str(TABLE).unwrap();
        let prefix = ParamKey::new("/servo_pid/linear_y");

        assert_eq!(table.get_f64(&prefix.join("p")), Some(1.5));
        assert_eq!(table.get_f64(&prefix.join("i_clamp")), Some(2.0));
        assert_eq!(table.get_f64(&prefix.join("d")), None);
        assert_eq!(table.get_f64(&ParamKey::new("/missing/table/p")), None);
        assert_eq!(table.get_f64(&ParamKey::new("/object_tracking/name")), None);
    }

    #[test]
    fn test_typed_get() {
        let table = ParamTable::from_toml_str(TABLE).unwrap();

        assert_eq!(
            table.get::<u32>(&ParamKey::new("/object_tracking/capture_size_x")),
            Some(640)
        );
        assert_eq!(
            table.get::<Tracking>(&ParamKey::new("/object_tracking")),
            Some(Tracking {
                capture_size_x: 640,
                name: String::from("cam0")
            })
        );
        assert_eq!(table.get::<u32>(&ParamKey::new("/object_tracking/name")), None);
    }

    #[test]
    fn test_load_from_sw_root() {
        let root = std::env::temp_dir().join(format!("util_params_test_{}", std::process::id()));
        std::fs::create_dir_all(root.join("params")).unwrap();
        std::fs::write(root.join("params").join("tracking.toml"), TABLE).unwrap();
        std::env::set_var(crate::host::SW_ROOT_ENV_VAR, &root);

        #[derive(Deserialize, Debug, PartialEq)]
        struct TrackingFile {
            object_tracking: Tracking,
        }

        let typed: TrackingFile = load("tracking.toml").unwrap();
        assert_eq!(typed.object_tracking.capture_size_x, 640);
        assert_eq!(typed.object_tracking.name, "cam0");

        let table = load_table("tracking.toml").unwrap();
        assert_eq!(
            table.get_f64(&ParamKey::new("/servo_pid/linear_y/p")),
            Some(1.5)
        );

        assert!(matches!(
            load::<TrackingFile>("missing.toml"),
            Err(LoadError::FileLoadError(_))
        ));

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            ParamTable::from_toml_str("p = = 1"),
            Err(LoadError::DeserialiseError(_))
        ));
    }
}
