use super::*;

/// The type an entry accepts, shown in --help and in type errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    String,
    Int,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    String(String),
    Int(i64),
}

impl ConfigValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::String(_) => ValueKind::String,
            Self::Int(_) => ValueKind::Int,
        }
    }
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::String(value) => write!(f, "{:?}", value),
            Self::Int(value) => write!(f, "{}", value),
        }
    }
}

type ApplyFn = Box<dyn Fn(&mut MasterConfig, ConfigValue, Option<&str>) -> Result<(), Box<dyn Error>>>;

/// A single named, typed configuration value. The apply function receives Some(source) describing where the
/// value came from if it was set by the user, or None if it is the default.
pub struct ConfigEntry {
    name: String,
    help: String,
    value: ConfigValue,
    source: Option<String>,
    apply: ApplyFn,
}

fn wrong_kind(value: &ConfigValue) -> Box<dyn Error> {
    format!("unexpected {} value {}", value.kind(), value).into()
}

impl ConfigEntry {
    pub fn new_bool<F>(name: &str, help: &str, default_value: bool, apply: F) -> Self
    where
        F: Fn(&mut MasterConfig, bool, Option<&str>) -> Result<(), Box<dyn Error>> + 'static,
    {
        Self::new(name, help, ConfigValue::Bool(default_value), move |conf, value, source| {
            match value {
                ConfigValue::Bool(value) => apply(conf, value, source),
                other => Err(wrong_kind(&other)),
            }
        })
    }

    pub fn new_string<F>(name: &str, help: &str, default_value: &str, apply: F) -> Self
    where
        F: Fn(&mut MasterConfig, String, Option<&str>) -> Result<(), Box<dyn Error>> + 'static,
    {
        let default_value = ConfigValue::String(default_value.to_string());
        Self::new(name, help, default_value, move |conf, value, source| match value {
            ConfigValue::String(value) => apply(conf, value, source),
            other => Err(wrong_kind(&other)),
        })
    }

    pub fn new_int<F>(name: &str, help: &str, default_value: i64, apply: F) -> Self
    where
        F: Fn(&mut MasterConfig, i64, Option<&str>) -> Result<(), Box<dyn Error>> + 'static,
    {
        Self::new(name, help, ConfigValue::Int(default_value), move |conf, value, source| {
            match value {
                ConfigValue::Int(value) => apply(conf, value, source),
                other => Err(wrong_kind(&other)),
            }
        })
    }

    fn new<F>(name: &str, help: &str, default_value: ConfigValue, apply: F) -> Self
    where
        F: Fn(&mut MasterConfig, ConfigValue, Option<&str>) -> Result<(), Box<dyn Error>> + 'static,
    {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            value: default_value,
            source: None,
            apply: Box::new(apply),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }
}

pub struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

impl ConfigBuilder {
    pub fn new(entries: Vec<ConfigEntry>) -> Self {
        let mut names = HashSet::new();
        for entry in &entries {
            if !names.insert(entry.name.as_str()) {
                panic!("duplicate configuration entry {}", entry.name);
            }
        }
        Self { entries }
    }

    /// The type the named entry accepts, or None if there is no such entry
    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(ConfigEntry::kind)
    }

    /// Overrides the named entry. The value must already be of the entry's type.
    pub fn set(&mut self, name: &str, value: ConfigValue, source: String) -> Result<(), Box<dyn Error>> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.name == name)
            .ok_or_else(|| format!("{} is not a valid option", name))?;
        if value.kind() != entry.kind() {
            return Err(format!(
                "{} is not valid for {} (expected: {})",
                value,
                name,
                entry.kind()
            )
            .into());
        }
        entry.value = value;
        entry.source = Some(source);
        Ok(())
    }

    /// Applies every entry in the order they were given, whether or not the user set it
    pub fn apply_to(&self, target: &mut MasterConfig) -> Result<(), Box<dyn Error>> {
        for entry in &self.entries {
            (entry.apply)(target, entry.value.clone(), entry.source.as_deref())
                .map_err(|e| format!("{} configuration option: {}", entry.name, e))?;
        }
        Ok(())
    }

    /// Usage text listing every entry, for --help
    pub fn help_text(&self) -> String {
        let mut text = format!(
            concat!(
                "usage: ghost-signal [port [cert [key]]] [--<option> <value>]...\n",
                "options can also be set in {}\n\n"
            ),
            DEFAULT_TOML_PATH
        );
        for entry in &self.entries {
            text.push_str(&format!(
                "  --{} <{}> (default {})\n      {}\n",
                entry.name,
                entry.kind(),
                entry.value,
                entry.help
            ));
        }
        text
    }
}
