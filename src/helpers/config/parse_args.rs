use super::*;

/// Entries that bare leading values are applied to, in order (`ghost-signal 443 cert.pem key.pem`)
const POSITIONAL_OPTIONS: [&str; 3] = ["port", "cert", "key"];

fn option_name(arg: &str) -> String {
    arg.trim_start_matches('-').replace('-', "_")
}

fn to_config_value(kind: ValueKind, value: Option<&str>) -> Option<ConfigValue> {
    match (kind, value) {
        (ValueKind::Bool, None) | (ValueKind::Bool, Some("true")) => Some(ConfigValue::Bool(true)),
        (ValueKind::Bool, Some("false")) => Some(ConfigValue::Bool(false)),
        (ValueKind::String, Some(value)) => Some(ConfigValue::String(value.to_owned())),
        (ValueKind::Int, Some(value)) => value.parse().ok().map(ConfigValue::Int),
        _ => None,
    }
}

fn try_set(
    builder: &mut ConfigBuilder,
    name: &str,
    arg: &str,
    value: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let kind = builder
        .kind_of(name)
        .ok_or_else(|| format!("{} is not a valid command line option", arg))?;
    let source = format!("{} command line argument", arg);
    match (to_config_value(kind, value), value) {
        (Some(parsed), _) => builder.set(name, parsed, source),
        (None, Some(value)) => {
            Err(format!("{} is not valid for {} (expected: {})", value, arg, kind).into())
        }
        (None, None) => Err(format!("{} argument is required for {}", kind, arg).into()),
    }
}

struct Arg {
    index: usize,
    name: String,
    values: Vec<String>,
}

/// Splits arguments into leading positional values and --option groups
fn group_args(args: &[String]) -> (Vec<String>, Vec<Arg>) {
    let mut positional = Vec::new();
    let mut grouped: Vec<Arg> = Vec::new();
    // The first argument is the program name
    for (index, arg) in args.iter().enumerate().skip(1) {
        if arg.starts_with('-') {
            grouped.push(Arg {
                index,
                name: arg.to_owned(),
                values: Vec::new(),
            });
        } else if let Some(last) = grouped.last_mut() {
            last.values.push(arg.to_owned());
        } else {
            positional.push(arg.to_owned());
        }
    }
    (positional, grouped)
}

/// Applies leading `port cert key` values, then --name value pairs, to the builder. A bool option given without
/// a value is set to true.
pub fn parse_args(builder: &mut ConfigBuilder, args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let (positional, grouped) = group_args(&args);
    if positional.len() > POSITIONAL_OPTIONS.len() {
        return Err(format!(
            "too many positional arguments ({}), expected at most port, cert and key",
            positional.join(" ")
        )
        .into());
    }
    for (name, value) in POSITIONAL_OPTIONS.iter().zip(&positional) {
        try_set(builder, name, &format!("positional {}", name), Some(value.as_str()))?;
    }
    for arg in grouped {
        let name = option_name(&arg.name);
        match arg.values.as_slice() {
            [] => try_set(builder, &name, &arg.name, None)?,
            [value] => try_set(builder, &name, &arg.name, Some(value.as_str()))?,
            values => {
                return Err(format!(
                    "command line argument {} ({}) has multiple values: {}",
                    arg.index,
                    arg.name,
                    values.join(" ")
                )
                .into())
            }
        }
    }
    Ok(())
}
