use super::*;

fn wants_help(args: &[String]) -> bool {
    args.iter().skip(1).any(|arg| arg == "--help" || arg == "-h")
}

/// Get the configuration from defaults, signal.toml (if present) and the command line, in that order
pub fn build_config() -> Result<MasterConfig, Box<dyn Error>> {
    build_config_with(real_filesystem(), std::env::args().collect())
}

pub fn build_config_with(fs: Filesystem, args: Vec<String>) -> Result<MasterConfig, Box<dyn Error>> {
    let mut builder = ConfigBuilder::new(server::server_config_entries());
    let mut conf = MasterConfig::default();
    if wants_help(&args) {
        print!("{}", builder.help_text());
        conf.happy_exit = true;
        return Ok(conf);
    }
    if fs.is_file(DEFAULT_TOML_PATH) {
        load_toml(DEFAULT_TOML_PATH, &mut builder, &fs)?;
    }
    parse_args(&mut builder, args)?;
    builder.apply_to(&mut conf)?;
    Ok(conf)
}
