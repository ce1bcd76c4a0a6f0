use crate::error::{Error, Result};

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial number of worker threads. `None` means one per logical CPU.
    pub num_workers: Option<usize>,

    /// Prefix for worker thread names.
    pub thread_name_prefix: String,

    /// Stack size for worker threads, in bytes.
    pub stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_workers: None,
            thread_name_prefix: "taskband-worker".to_string(),
            stack_size: Some(2 * 1024 * 1024),
        }
    }
}

impl Config {
    /// Start building a configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Check the configuration for invalid values.
    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.num_workers {
            if n == 0 {
                return Err(Error::config("num_workers must be > 0"));
            }
            if n > 1024 {
                return Err(Error::config("num_workers too large (max 1024)"));
            }
        }

        if self.thread_name_prefix.is_empty() {
            return Err(Error::config("thread_name_prefix must not be empty"));
        }

        Ok(())
    }

    /// The worker count the pool starts with.
    pub fn initial_workers(&self) -> usize {
        self.num_workers.unwrap_or_else(num_cpus::get)
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder holding the default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the initial number of worker threads.
    pub fn num_workers(mut self, n: usize) -> Self {
        self.config.num_workers = Some(n);
        self
    }

    /// Set the worker thread name prefix.
    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker thread stack size, in bytes.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
        assert!(Config::default().initial_workers() >= 1);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = Config::builder().num_workers(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::builder()
            .num_workers(3)
            .thread_name_prefix("crunch")
            .stack_size(1024 * 1024)
            .build()
            .unwrap();

        assert_eq!(config.initial_workers(), 3);
        assert_eq!(config.thread_name_prefix, "crunch");
        assert_eq!(config.stack_size, Some(1024 * 1024));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let result = Config::builder().thread_name_prefix("").build();
        assert!(result.is_err());
    }
}
