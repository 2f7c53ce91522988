mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Cache, Config, Lineage, Search};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.cache.ttl_secs <= 0 {
		return Err(Error::Validation {
			message: "cache.ttl_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.lineage.default_max_hops == 0 {
		return Err(Error::Validation {
			message: "lineage.default_max_hops must be greater than zero.".to_string(),
		});
	}
	if cfg.lineage.max_relationships == 0 {
		return Err(Error::Validation {
			message: "lineage.max_relationships must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_terms_per_batch == 0 {
		return Err(Error::Validation {
			message: "search.max_terms_per_batch must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_agg_values == 0 {
		return Err(Error::Validation {
			message: "search.max_agg_values must be greater than zero.".to_string(),
		});
	}

	Ok(())
}
