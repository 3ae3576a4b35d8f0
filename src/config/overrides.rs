//! Command-line overrides layered on top of a validated configuration.

use crate::config::schema::ValidatedConfig;

/// Values supplied on the command line that replace file values.
///
/// A zero count is treated as "not given" so the validated default stays in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub source_url: Option<String>,
    pub target_url: Option<String>,
    pub batch_size: Option<usize>,
    pub parallel_size: Option<usize>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.source_url.is_none()
            && self.target_url.is_none()
            && self.batch_size.filter(|n| *n > 0).is_none()
            && self.parallel_size.filter(|n| *n > 0).is_none()
    }

    /// Return `config` with every given override applied.
    pub fn apply(&self, mut config: ValidatedConfig) -> ValidatedConfig {
        if let Some(url) = &self.source_url {
            tracing::info!(section = "extractor", "Overriding source url from command line");
            config.extractor.url = url.clone();
        }
        if let Some(url) = &self.target_url {
            tracing::info!(section = "sinker", "Overriding target url from command line");
            config.sinker.url = url.clone();
        }
        if let Some(batch_size) = self.batch_size.filter(|n| *n > 0) {
            tracing::info!(batch_size, "Overriding sinker batch_size from command line");
            config.sinker.batch_size = batch_size;
        }
        if let Some(parallel_size) = self.parallel_size.filter(|n| *n > 0) {
            tracing::info!(parallel_size, "Overriding parallelizer parallel_size from command line");
            config.parallelizer.parallel_size = parallel_size;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ini::ConfigTree;
    use crate::config::validation::validate_config;

    fn base() -> ValidatedConfig {
        let tree = ConfigTree::parse(
            "[extractor]\ndb_type=mysql\nextract_type=snapshot\nurl=mysql://src\n\
             [sinker]\ndb_type=pg\nsink_type=write\nurl=pg://dst\nbatch_size=50\n\
             [runtime]\n[parallelizer]\nparallel_size=2\n[pipeline]\n[filter]\n[router]\n[resumer]\n",
        )
        .unwrap();
        validate_config(&tree).unwrap()
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let overrides = Overrides::default();
        assert!(overrides.is_empty());
        assert_eq!(overrides.apply(base()), base());
    }

    #[test]
    fn test_overrides_replace_values() {
        let overrides = Overrides {
            source_url: Some("mysql://other".into()),
            batch_size: Some(500),
            parallel_size: Some(8),
            ..Default::default()
        };
        let config = overrides.apply(base());
        assert_eq!(config.extractor.url, "mysql://other");
        assert_eq!(config.sinker.url, "pg://dst");
        assert_eq!(config.sinker.batch_size, 500);
        assert_eq!(config.parallelizer.parallel_size, 8);
    }

    #[test]
    fn test_zero_counts_are_ignored() {
        let overrides = Overrides {
            batch_size: Some(0),
            parallel_size: Some(0),
            ..Default::default()
        };
        assert!(overrides.is_empty());
        let config = overrides.apply(base());
        assert_eq!(config.sinker.batch_size, 50);
        assert_eq!(config.parallelizer.parallel_size, 2);
    }
}
