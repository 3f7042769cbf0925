use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Product catalog CSV file
    #[serde(default = "default_products_path")]
    pub products_path: String,

    /// Purchase events CSV file
    #[serde(default = "default_purchases_path")]
    pub purchases_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Recommendations returned when the request does not ask for a count
    #[serde(default = "default_recommendations")]
    pub default_recommendations: usize,

    /// Upper bound on the requested recommendation count
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Reuse the similarity matrix while the purchase data is unchanged
    #[serde(default)]
    pub similarity_cache: bool,
}

fn default_products_path() -> String {
    "data/sample_products.csv".to_string()
}

fn default_purchases_path() -> String {
    "data/sample_purchases.csv".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_recommendations() -> usize {
    5
}

fn default_max_recommendations() -> usize {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            products_path: default_products_path(),
            purchases_path: default_purchases_path(),
            host: default_host(),
            port: default_port(),
            default_recommendations: default_recommendations(),
            max_recommendations: default_max_recommendations(),
            similarity_cache: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.default_recommendations > config.max_recommendations {
            anyhow::bail!(
                "DEFAULT_RECOMMENDATIONS ({}) exceeds MAX_RECOMMENDATIONS ({})",
                config.default_recommendations,
                config.max_recommendations
            );
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(Vec::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("PRODUCTS_PATH", "/data/p.csv"),
            ("PORT", "8080"),
            ("SIMILARITY_CACHE", "true"),
            ("DEFAULT_RECOMMENDATIONS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.products_path, "/data/p.csv");
        assert_eq!(config.port, 8080);
        assert!(config.similarity_cache);
        assert_eq!(config.default_recommendations, 3);
    }

    #[test]
    fn test_invalid_port() {
        assert!(Config::from_vars(vars(&[("PORT", "not-a-port")])).is_err());
    }

    #[test]
    fn test_default_above_max_rejected() {
        let result = Config::from_vars(vars(&[
            ("DEFAULT_RECOMMENDATIONS", "10"),
            ("MAX_RECOMMENDATIONS", "4"),
        ]));
        assert!(result.is_err());
    }
}
