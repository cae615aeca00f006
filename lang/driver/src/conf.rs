use sculptor::{AppAuthor, FileIO, ProjectInfo, impl_serde_str_toml};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
    /// load the derived keywords (`let`, `cond`, ...) into fresh environments
    pub prelude: bool,
    /// host libraries imported into every session
    pub libraries: Vec<String>,
    /// files evaluated before user code
    pub preload: Vec<PathBuf>,
    pub window_title: String,
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            prelude: true,
            libraries: roux_host::LIBRARIES.iter().map(|s| s.to_string()).collect(),
            preload: Vec::new(),
            window_title: "roux".to_string(),
        }
    }
}

impl_serde_str_toml!(Conf);

impl AppAuthor for Conf {
    fn app_name() -> &'static str {
        "Roux"
    }

    fn author() -> &'static str {
        "Roux Project"
    }
}

impl Conf {
    /// Read `roux.toml` from the config dir, writing the defaults there when
    /// it cannot be read.
    pub fn load() -> Self {
        let path = Conf::config_dir().join("roux.toml");
        let file_conf = FileIO::new(path.clone());
        file_conf.load().unwrap_or_else(|_| {
            log::warn!("Using default configuration; suppose to find one at `{}`.", path.display());
            let conf: Conf = Default::default();
            if let Err(err) = file_conf.save(&conf) {
                log::warn!("Could not write the default configuration: {}", err);
            }
            conf
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_files_fill_in_defaults() {
        let conf: Conf = toml::from_str("window_title = \"demo\"").unwrap();
        assert_eq!(conf.window_title, "demo");
        assert!(conf.prelude);
        assert_eq!(conf.libraries, vec!["document".to_string(), "window".to_string()]);
    }
}
