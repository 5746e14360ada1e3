use validator::Validate;

#[derive(Deserialize, Debug, Validate)]
pub struct Config {
    database_url: String,
    api_host: Option<String>,
    api_port: Option<usize>,
    /// symmetric signing key for access tokens, no literal fallback on purpose
    #[validate(length(min = 32))]
    jwt_secret: String,
    /// upper bound on the database connection pool
    #[serde(default = "default_pool_size")]
    database_pool_size: u32,
}

fn default_pool_size() -> u32 {
    16
}

lazy_static! {
    static ref CONFIG: Config = match envy::from_env::<Config>() {
        Ok(config) => {
            match config.validate() {
                Ok(()) => config,
                Err(e) => panic!("invalid environment variable: {}", e),
            }
        }
        Err(error) => panic!("Missing or incorrect environment variable: {}", error),
    };
}

impl Config {
    pub fn database_url() -> &'static str {
        CONFIG.database_url.as_ref()
    }

    pub fn api_host() -> &'static str {
        match &CONFIG.api_host {
            Some(host) => host.as_ref(),
            None => "localhost",
        }
    }

    pub fn api_port() -> usize {
        CONFIG.api_port.unwrap_or(8080)
    }

    pub fn jwt_secret() -> &'static [u8] {
        CONFIG.jwt_secret.as_bytes()
    }

    pub fn database_pool_size() -> u32 {
        CONFIG.database_pool_size
    }
}
