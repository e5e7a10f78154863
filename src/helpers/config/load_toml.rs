use super::*;

pub const DEFAULT_TOML_PATH: &str = "signal.toml";

fn to_config_value(name: &str, value: toml::Value) -> Result<ConfigValue, Box<dyn Error>> {
    match value {
        toml::Value::Boolean(v) => Ok(ConfigValue::Bool(v)),
        toml::Value::String(v) => Ok(ConfigValue::String(v)),
        toml::Value::Integer(v) => Ok(ConfigValue::Int(v)),
        other => Err(format!("{} is not valid for {}", other, name).into()),
    }
}

/// Feeds every top level key of a TOML file into the builder
pub fn load_toml(
    path: &str,
    builder: &mut ConfigBuilder,
    fs: &Filesystem,
) -> Result<(), Box<dyn Error>> {
    let contents = fs.read_to_string(path)?;
    let parsed = contents
        .parse::<toml::Value>()
        .map_err(|e| format!("{}: {}", path, e))?;
    match parsed {
        toml::Value::Table(table) => {
            for (name, value) in table {
                let source = format!("{} in {}", name, path);
                to_config_value(&name, value)
                    .and_then(|value| builder.set(&name, value, source))
                    .map_err(|e| format!("{}: {}", path, e))?;
            }
            Ok(())
        }
        _ => Err(format!("toplevel value of {} is not a table", path).into()),
    }
}
