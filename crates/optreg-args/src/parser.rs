use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use optreg_store::{raw, AnyKey, CodecError, Key, KeyError, KeyResult, KeyValue, RawValue, Store, StoreDefinition};
use tracing::{debug, warn};

use crate::config::ArgsConfig;
use crate::error::{ArgsError, ArgsResult};

/// A flag as written on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Flag {
    Long(String),
    Short(char),
}

impl Flag {
    fn parse(flag: &str) -> ArgsResult<Self> {
        if let Some(long) = flag.strip_prefix("--") {
            if !long.is_empty() && !long.starts_with('-') {
                return Ok(Self::Long(long.to_string()));
            }
        } else if let Some(short) = flag.strip_prefix('-') {
            let mut chars = short.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if c != '-' {
                    return Ok(Self::Short(c));
                }
            }
        }
        Err(ArgsError::InvalidFlag {
            flag: flag.to_string(),
        })
    }

    fn attach(&self, arg: Arg) -> Arg {
        match self {
            Self::Long(name) => arg.long(name.clone()),
            Self::Short(c) => arg.short(*c),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(name) => write!(f, "--{name}"),
            Self::Short(c) => write!(f, "-{c}"),
        }
    }
}

/// Turns the values following a flag into a boxed key value.
type ValuesParser = Arc<dyn Fn(&[String]) -> KeyResult<RawValue> + Send + Sync>;

enum MappingKind {
    /// Presence sets the key to `true`.
    Switch,
    /// Takes one value, decoded through the key's codec.
    Value,
    /// Takes `count` values, handed together to a custom parser.
    Values { count: usize, parse: ValuesParser },
}

struct Mapping {
    flag: Flag,
    key: Arc<dyn AnyKey>,
    kind: MappingKind,
}

/// Result of [`ArgsParser::parse`].
#[derive(Debug)]
pub enum ParseOutcome {
    /// A help flag was given; holds the rendered help text.
    Help(String),
    /// The arguments were parsed into a store carrying the parser's definition.
    Parsed(Store),
}

/// Parses command-line arguments into a [`Store`].
///
/// Flags are derived from a [`StoreDefinition`]: every boolean key becomes a
/// switch `--name`, every other key with a codec becomes `--name <VALUE>`.
/// Keys without a codec get no flag, nor do keys whose derived flag is
/// malformed or already taken by a help or ignored flag. Further mappings
/// can be added with [`map`](Self::map) and [`map_values`](Self::map_values).
/// Absent flags leave their key unset.
pub struct ArgsParser {
    definition: Arc<StoreDefinition>,
    config: ArgsConfig,
    mappings: Vec<Mapping>,
    ignored: Vec<String>,
    help: Vec<Flag>,
}

impl ArgsParser {
    /// Parser for `definition` with the default configuration.
    pub fn new(definition: Arc<StoreDefinition>) -> ArgsResult<Self> {
        Self::with_config(definition, ArgsConfig::default())
    }

    /// Fails only when the configured help or ignore flags are malformed or
    /// repeat each other.
    pub fn with_config(definition: Arc<StoreDefinition>, config: ArgsConfig) -> ArgsResult<Self> {
        let mut parser = Self {
            definition: Arc::clone(&definition),
            config: ArgsConfig::default(),
            mappings: Vec::new(),
            ignored: Vec::new(),
            help: Vec::new(),
        };

        for flag in &config.help_flags {
            let flag = Flag::parse(flag)?;
            parser.claim(&flag.to_string())?;
            parser.help.push(flag);
        }
        for flag in &config.ignore_flags {
            parser.ignore(flag)?;
        }
        for key in definition.keys() {
            if !is_switch(key.as_ref()) && !key.has_codec() {
                debug!(key = key.name(), "no flag for key without codec");
                continue;
            }
            let flag = format!("--{}", key.name());
            if let Err(error) = parser.map_erased(Arc::clone(key), &flag) {
                warn!(key = key.name(), %flag, %error, "no derived flag for key");
            }
        }
        parser.config = config;

        debug!(
            definition = definition.name(),
            flags = parser.mappings.len(),
            "built argument parser"
        );
        Ok(parser)
    }

    pub fn definition(&self) -> &Arc<StoreDefinition> {
        &self.definition
    }

    pub fn config(&self) -> &ArgsConfig {
        &self.config
    }

    /// Map `flag` to `key`. Boolean keys become switches; any other key needs
    /// a codec.
    pub fn map<T: KeyValue>(&mut self, key: &Key<T>, flag: &str) -> ArgsResult<&mut Self> {
        self.map_erased(key.erased(), flag)
    }

    pub fn map_erased(&mut self, key: Arc<dyn AnyKey>, flag: &str) -> ArgsResult<&mut Self> {
        let kind = if is_switch(key.as_ref()) {
            MappingKind::Switch
        } else if key.has_codec() {
            MappingKind::Value
        } else {
            return Err(ArgsError::NotDecodable {
                key: key.name().to_string(),
                flag: flag.to_string(),
            });
        };
        let flag = Flag::parse(flag)?;
        self.claim(&flag.to_string())?;
        self.mappings.push(Mapping { flag, key, kind });
        Ok(self)
    }

    /// Map `flag` to `key`, taking exactly `count` values and building the
    /// key's value from them with `parse`. With a `count` of 0 the flag is a
    /// switch and `parse` receives no values.
    pub fn map_values<T, F>(
        &mut self,
        key: &Key<T>,
        flag: &str,
        count: usize,
        parse: F,
    ) -> ArgsResult<&mut Self>
    where
        T: KeyValue,
        F: Fn(&[String]) -> Result<T, CodecError> + Send + Sync + 'static,
    {
        let flag = Flag::parse(flag)?;
        self.claim(&flag.to_string())?;

        let name = key.name().to_string();
        let parse: ValuesParser = Arc::new(move |values: &[String]| {
            parse(values).map(raw).map_err(|source| KeyError::Decode {
                key: name.clone(),
                source,
            })
        });
        self.mappings.push(Mapping {
            flag,
            key: key.erased(),
            kind: MappingKind::Values { count, parse },
        });
        Ok(self)
    }

    /// Accept `flag` and drop it together with the value that follows it.
    /// Any token without whitespace works, dashed or not (`//`).
    pub fn ignore(&mut self, flag: &str) -> ArgsResult<&mut Self> {
        if flag.is_empty() || flag == "--" || flag.chars().any(char::is_whitespace) {
            return Err(ArgsError::InvalidFlag {
                flag: flag.to_string(),
            });
        }
        self.claim(flag)?;
        self.ignored.push(flag.to_string());
        Ok(self)
    }

    /// Every registered flag, in registration order.
    pub fn flags(&self) -> Vec<String> {
        self.help
            .iter()
            .map(Flag::to_string)
            .chain(self.ignored.iter().cloned())
            .chain(self.mappings.iter().map(|m| m.flag.to_string()))
            .collect()
    }

    /// The `clap` command the arguments are matched against. Ignored flags
    /// are removed before matching and do not appear here.
    pub fn command(&self) -> Command {
        let mut command = Command::new(self.config.program_name.clone())
            .disable_help_flag(true)
            .args_override_self(true);

        for flag in &self.help {
            command = command.arg(
                flag.attach(Arg::new(flag.to_string()))
                    .action(ArgAction::Help)
                    .help("Print help"),
            );
        }
        for mapping in &self.mappings {
            let arg = mapping
                .flag
                .attach(Arg::new(mapping.flag.to_string()))
                .help(help_line(mapping.key.as_ref()));
            let arg = match &mapping.kind {
                MappingKind::Switch | MappingKind::Values { count: 0, .. } => {
                    arg.action(ArgAction::SetTrue)
                }
                MappingKind::Value => arg
                    .action(ArgAction::Set)
                    .num_args(1)
                    .value_name("VALUE")
                    .value_parser(clap::value_parser!(String))
                    .allow_hyphen_values(true),
                MappingKind::Values { count, .. } => arg
                    .action(ArgAction::Set)
                    .num_args(*count)
                    .value_name("VALUE")
                    .value_parser(clap::value_parser!(String))
                    .allow_hyphen_values(true),
            };
            command = command.arg(arg);
        }
        command
    }

    /// Parse `args` (without the program name).
    pub fn parse<I, S>(&self, args: I) -> ArgsResult<ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        let argv = std::iter::once(OsString::from(&self.config.program_name))
            .chain(self.strip_ignored(args.into_iter().map(Into::into)));

        let matches = match self.command().try_get_matches_from(argv) {
            Ok(matches) => matches,
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                return Ok(ParseOutcome::Help(err.render().to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let store = self.collect(&matches)?;
        debug!(
            definition = self.definition.name(),
            values = store.len(),
            "parsed arguments"
        );
        Ok(ParseOutcome::Parsed(store))
    }

    /// Drop every ignored flag with the token after it. `--flag=value`
    /// forms of dashed ignored flags are dropped alone.
    fn strip_ignored(&self, mut args: impl Iterator<Item = OsString>) -> Vec<OsString> {
        let mut kept = Vec::new();
        while let Some(arg) = args.next() {
            let Some(text) = arg.to_str() else {
                kept.push(arg);
                continue;
            };
            if self.ignored.iter().any(|flag| flag == text) {
                args.next();
                continue;
            }
            let inline = self.ignored.iter().any(|flag| {
                flag.starts_with("--")
                    && text
                        .strip_prefix(flag.as_str())
                        .is_some_and(|rest| rest.starts_with('='))
            });
            if !inline {
                kept.push(arg);
            }
        }
        kept
    }

    fn collect(&self, matches: &ArgMatches) -> ArgsResult<Store> {
        let mut store = Store::with_definition(Arc::clone(&self.definition));
        for mapping in &self.mappings {
            let id = mapping.flag.to_string();
            match &mapping.kind {
                MappingKind::Switch => {
                    if matches.get_flag(&id) {
                        store.set_raw(&mapping.key, raw(true))?;
                    }
                }
                MappingKind::Value => {
                    if let Some(text) = matches.get_one::<String>(&id) {
                        let value = mapping.key.decode_raw(text)?;
                        store.set_raw(&mapping.key, value)?;
                    }
                }
                MappingKind::Values { count: 0, parse } => {
                    if matches.get_flag(&id) {
                        store.set_raw(&mapping.key, parse(&[])?)?;
                    }
                }
                MappingKind::Values { parse, .. } => {
                    if let Some(values) = matches.get_many::<String>(&id) {
                        let values: Vec<String> = values.cloned().collect();
                        store.set_raw(&mapping.key, parse(&values)?)?;
                    }
                }
            }
        }
        Ok(store)
    }

    /// Reserve `flag`, failing if it is already registered.
    fn claim(&self, flag: &str) -> ArgsResult<()> {
        let taken = self.help.iter().any(|existing| existing.to_string() == flag)
            || self.ignored.iter().any(|existing| existing == flag)
            || self.mappings.iter().any(|m| m.flag.to_string() == flag);
        if taken {
            return Err(ArgsError::DuplicateFlag {
                flag: flag.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ArgsParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgsParser")
            .field("definition", &self.definition.name())
            .field("program_name", &self.config.program_name)
            .field("flags", &self.flags())
            .finish()
    }
}

fn is_switch(key: &dyn AnyKey) -> bool {
    key.accepts_raw(&false)
}

fn help_line(key: &dyn AnyKey) -> String {
    let default = key
        .default_raw()
        .and_then(|value| key.encode_raw(value.as_ref()).ok())
        .filter(|encoded| !encoded.is_empty());
    match default {
        Some(default) => format!("{} [{}, default: {}]", key.label(), key.type_name(), default),
        None => format!("{} [{}]", key.label(), key.type_name()),
    }
}
