use super::*;

/// Configuration for the whole ghost-signal program
#[derive(Debug)]
pub struct MasterConfig {
    /// If to exit successfully without serving (for example, after showing --help)
    pub happy_exit: bool,
    pub server: server::ServerConfig,
}

impl Default for MasterConfig {
    /// NOTE: the defaults you actually get when running are determined by the config entries, this is just an empty
    /// struct for them to fill in
    fn default() -> Self {
        Self {
            happy_exit: false,
            server: server::ServerConfig::default(),
        }
    }
}
