use std::path::PathBuf;
use std::time::Duration;

use track_engine::{Concurrency, Role, SessionConfig, Variant, DEFAULT_MAP_FILE};

use super::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Help,
    Play {
        map: PathBuf,
        /// No map was named, so the default one is used.
        defaulted: bool,
    },
    Edit {
        map: PathBuf,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CommonOptions {
    pub(crate) variant: Option<Variant>,
    pub(crate) frame_ms: Option<u64>,
    pub(crate) intro_ms: Option<u64>,
    pub(crate) threaded: bool,
    pub(crate) latch: Option<bool>,
    pub(crate) width: Option<u32>,
}

impl CommonOptions {
    /// Picks the preset for `role` and layers the flags on top of it.
    pub(crate) fn session_config(&self, role: Role) -> Result<SessionConfig, AppError> {
        let variant = match self.variant {
            Some(variant) if variant.role() != role => {
                return Err(AppError::Usage(format!(
                    "variant '{variant}' cannot be used with the {} subcommand",
                    subcommand_name(role)
                )));
            }
            Some(variant) => variant,
            None => default_variant(role, self.threaded, self.latch),
        };

        let mut config = variant.config().with_frame_budget_override(self.frame_ms);
        if self.threaded {
            config.concurrency = Concurrency::Threaded;
        }
        if let Some(latch) = self.latch {
            config.move_latch = latch;
        }
        if let Some(intro_ms) = self.intro_ms {
            config.intro_delay = Duration::from_millis(intro_ms);
        }
        Ok(config)
    }
}

fn default_variant(role: Role, threaded: bool, latch: Option<bool>) -> Variant {
    match (role, threaded, latch) {
        (Role::Editor, false, _) => Variant::Editor,
        (Role::Editor, true, _) => Variant::ThreadEditor,
        (Role::Player, false, _) => Variant::Racer,
        (Role::Player, true, Some(true)) => Variant::LatchedRacer,
        (Role::Player, true, _) => Variant::ThreadRacer,
    }
}

fn subcommand_name(role: Role) -> &'static str {
    match role {
        Role::Editor => "edit",
        Role::Player => "play",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub(crate) command: Command,
    pub(crate) options: CommonOptions,
}

pub(crate) fn parse_args(args: &[String]) -> Result<Invocation, AppError> {
    if args.is_empty() {
        return Err(AppError::Usage("missing subcommand".to_string()));
    }
    if args[0] == "-h" || args[0] == "--help" {
        return Ok(Invocation {
            command: Command::Help,
            options: CommonOptions::default(),
        });
    }

    let mut options = CommonOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--variant" => {
                let value = flag_value(args, index)?;
                options.variant = Some(value.parse::<Variant>().map_err(AppError::Usage)?);
                index += 2;
            }
            "--frame-ms" => {
                let value = flag_value(args, index)?;
                options.frame_ms = Some(value.parse::<u64>().map_err(|_| {
                    AppError::Usage(format!("invalid --frame-ms value '{value}' (expected u64)"))
                })?);
                index += 2;
            }
            "--intro-ms" => {
                let value = flag_value(args, index)?;
                options.intro_ms = Some(value.parse::<u64>().map_err(|_| {
                    AppError::Usage(format!("invalid --intro-ms value '{value}' (expected u64)"))
                })?);
                index += 2;
            }
            "--width" => {
                let value = flag_value(args, index)?;
                options.width = Some(value.parse::<u32>().map_err(|_| {
                    AppError::Usage(format!("invalid --width value '{value}' (expected u32)"))
                })?);
                index += 2;
            }
            "--threaded" => {
                options.threaded = true;
                index += 1;
            }
            "--latch" => {
                options.latch = Some(true);
                index += 1;
            }
            "--no-latch" => {
                options.latch = Some(false);
                index += 1;
            }
            "-h" | "--help" => {
                return Ok(Invocation {
                    command: Command::Help,
                    options,
                });
            }
            other if other.starts_with('-') => {
                return Err(AppError::Usage(format!("unknown option '{other}'")));
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| AppError::Usage("missing subcommand".to_string()))?
        .as_str();
    let command_args = &args[(index + 1)..];
    if command_args.len() > 1 {
        return Err(AppError::Usage(format!(
            "{command} takes at most one map path"
        )));
    }

    let command = match command {
        "play" => {
            if options.width.is_some() {
                return Err(AppError::Usage("--width only applies to edit".to_string()));
            }
            match command_args.first() {
                Some(path) => Command::Play {
                    map: PathBuf::from(path),
                    defaulted: false,
                },
                None => Command::Play {
                    map: PathBuf::from(DEFAULT_MAP_FILE),
                    defaulted: true,
                },
            }
        }
        "edit" => {
            if options.latch.is_some() {
                return Err(AppError::Usage(
                    "--latch/--no-latch only apply to play".to_string(),
                ));
            }
            let path = command_args
                .first()
                .ok_or_else(|| AppError::Usage("edit requires a map path".to_string()))?;
            Command::Edit {
                map: PathBuf::from(path),
            }
        }
        other => return Err(AppError::Usage(format!("unknown subcommand '{other}'"))),
    };

    Ok(Invocation { command, options })
}

fn flag_value(args: &[String], index: usize) -> Result<&str, AppError> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| AppError::Usage(format!("missing value for {}", args[index])))
}

pub(crate) fn usage_text() -> String {
    let variants = Variant::ALL.map(Variant::name).join(", ");
    [
        "term_racer - terminal track racer and track editor".to_string(),
        String::new(),
        "Usage:".to_string(),
        "  term_racer [--variant <name>] [--frame-ms <u64>] [--intro-ms <u64>] [--threaded] [--latch|--no-latch] play [<map>]".to_string(),
        "  term_racer [--variant <name>] [--frame-ms <u64>] [--intro-ms <u64>] [--threaded] [--width <20-80>] edit <map>".to_string(),
        "  term_racer -h | --help".to_string(),
        String::new(),
        "Defaults:".to_string(),
        format!("  play map {DEFAULT_MAP_FILE}"),
        "  --intro-ms 3000".to_string(),
        format!("  --variant is one of: {variants}"),
        String::new(),
        "Environment:".to_string(),
        format!(
            "  {} overrides the preset frame budget (ms)",
            track_engine::FRAME_MS_ENV_VAR
        ),
    ]
    .join("\n")
}
