use std::net::IpAddr;
use std::path::PathBuf;
use clap::Parser;

pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/ngshiheng/michelin-my-maps/main/data/michelin_my_maps.csv";

#[derive(Parser, Clone, Debug)]
pub struct Config {
    #[clap(env, long, default_value = "local")]
    pub environment: String,

    #[clap(env, long, default_value = "127.0.0.1")]
    pub bind_address: IpAddr,

    #[clap(env, long, default_value_t = 3000)]
    pub port: u16,

    /// Comma separated list of allowed CORS origins, `*` allows any origin
    #[clap(env, long, default_value = "*")]
    pub origin_urls: String,

    #[clap(env, long, default_value = DEFAULT_DATASET_URL)]
    pub dataset_url: String,

    /// Local CSV file, takes precedence over `dataset_url` when set
    #[clap(env, long)]
    pub dataset_path: Option<PathBuf>,

    #[clap(env, long, default_value_t = false)]
    pub preload_dataset: bool,

    #[clap(env, long, default_value_t = 100)]
    pub max_page_size: usize,

    #[clap(env, long, default_value_t = 30)]
    pub fetch_timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults_without_arguments() {
        let config = Config::try_parse_from(["michelin-mind-backend"]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.origin_urls, "*");
        assert_eq!(config.dataset_url, DEFAULT_DATASET_URL);
        assert!(config.dataset_path.is_none());
        assert_eq!(config.max_page_size, 100);
    }

    #[test]
    fn dataset_path_overrides_are_parsed() {
        let config = Config::try_parse_from([
            "michelin-mind-backend",
            "--dataset-path",
            "/tmp/michelin.csv",
            "--port",
            "8080",
            "--preload-dataset",
        ]).unwrap();

        assert_eq!(config.dataset_path, Some(PathBuf::from("/tmp/michelin.csv")));
        assert_eq!(config.port, 8080);
        assert!(config.preload_dataset);
    }
}
