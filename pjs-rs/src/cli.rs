//! Command-line argument parsing.
//!
//! Usage:
//!   pjs [-f <exp>] [-m <exp>] [-r <exp>] [-eij] [files ...]

use std::path::PathBuf;

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    /// Keep lines matching this expression (`-f`, `--filter`).
    pub filter: Option<String>,
    /// Transform each line with this expression (`-m`, `--map`).
    pub map: Option<String>,
    /// Reduce to a single value (`-r`, `--reduce`).
    pub reduce: Option<String>,
    /// Bind the line only to `$` (`-e`, `--explicit`).
    pub explicit: bool,
    /// Skip empty input lines (`-i`, `--ignore`).
    pub ignore_empty: bool,
    /// Write output as JSON (`-j`, `--json`).
    pub json: bool,
    /// Input files, read in order.  Empty means stdin.
    pub inputs: Vec<Input>,
}

/// One input source.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

/// What the command line asks for.
#[derive(Debug, PartialEq)]
pub enum Command {
    Run(CliArgs),
    Help,
    Version,
}

impl CliArgs {
    /// `true` when at least one of filter, map or reduce was given.
    pub fn has_stage(&self) -> bool {
        self.filter.is_some() || self.map.is_some() || self.reduce.is_some()
    }
}

pub const USAGE: &str = "\
Usage: pjs [options] [files ...]

Options:
  -f, --filter <exp>   keep lines for which <exp> is truthy
  -m, --map <exp>      replace each line with the value of <exp>
  -r, --reduce <exp>   reduce to one value: length, min, max, sum, avg,
                       concat, or an expression over prev, curr, i, array
  -e, --explicit       bind the line only to $
  -i, --ignore         ignore empty lines
  -j, --json           write output as JSON
  -h, --help           print this help
  -V, --version        print the version

Stages run in the order filter, map, reduce. With no files, or with -,
lines are read from standard input.";

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return a [`Command`] or an error message.
pub fn parse_args() -> Result<Command, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<Command, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            args.inputs.extend(argv[i + 1..].iter().map(|a| input_from(a)));
            break;
        }

        // Non-flag argument.
        if !arg.starts_with('-') || arg == "-" {
            args.inputs.push(input_from(arg));
            i += 1;
            continue;
        }

        // Long option, with the value attached (`--map=exp`) or following.
        if let Some(long) = arg.strip_prefix("--") {
            let (name, attached) = match long.split_once('=') {
                Some((n, v)) => (n, Some(v.to_owned())),
                None => (long, None),
            };
            match name {
                "help" => return Ok(Command::Help),
                "version" => return Ok(Command::Version),
                "explicit" => args.explicit = true,
                "ignore" => args.ignore_empty = true,
                "json" => args.json = true,
                "filter" | "map" | "reduce" => {
                    let value = match attached {
                        Some(v) => v,
                        None => take_value(argv, &mut i, name)?,
                    };
                    set_stage(&mut args, name, value)?;
                }
                _ => return Err(format!("unknown option: --{name}")),
            }
            i += 1;
            continue;
        }

        // Short flags: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'h' => return Ok(Command::Help),
                'V' => return Ok(Command::Version),
                'e' => args.explicit = true,
                'i' => args.ignore_empty = true,
                'j' => args.json = true,

                // -f<exp> / -f <exp>, likewise -m and -r
                c @ ('f' | 'm' | 'r') => {
                    let name = match c {
                        'f' => "filter",
                        'm' => "map",
                        _ => "reduce",
                    };
                    let value = if j + 1 < chars.len() {
                        let v: String = chars[j + 1..].iter().collect();
                        j = chars.len(); // consumed rest of this arg
                        v
                    } else {
                        take_value(argv, &mut i, name)?
                    };
                    set_stage(&mut args, name, value)?;
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    if !args.has_stage() {
        return Err("one of --filter, --map or --reduce is required".to_owned());
    }
    Ok(Command::Run(args))
}

fn input_from(arg: &str) -> Input {
    if arg == "-" {
        Input::Stdin
    } else {
        Input::File(PathBuf::from(arg))
    }
}

/// Consume the argument after position `i` as the value of `--name`.
fn take_value(argv: &[String], i: &mut usize, name: &str) -> Result<String, String> {
    if *i + 1 < argv.len() {
        *i += 1;
        Ok(argv[*i].clone())
    } else {
        Err(format!("--{name} requires an expression argument"))
    }
}

fn set_stage(args: &mut CliArgs, name: &str, value: String) -> Result<(), String> {
    let slot = match name {
        "filter" => &mut args.filter,
        "map" => &mut args.map,
        _ => &mut args.reduce,
    };
    if slot.is_some() {
        return Err(format!("--{name} given more than once"));
    }
    *slot = Some(value);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|&s| s.to_owned()).collect()
    }

    fn run(args: &[&str]) -> CliArgs {
        match parse_argv(&argv(args)) {
            Ok(Command::Run(a)) => a,
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn stage_required() {
        assert!(parse_argv(&argv(&[])).is_err());
        assert!(parse_argv(&argv(&["-e", "file.txt"])).is_err());
    }

    #[test]
    fn separate_values() {
        let a = run(&["-f", "length > 2", "-m", "toUpperCase()", "-r", "concat"]);
        assert_eq!(a.filter.as_deref(), Some("length > 2"));
        assert_eq!(a.map.as_deref(), Some("toUpperCase()"));
        assert_eq!(a.reduce.as_deref(), Some("concat"));
        assert!(a.inputs.is_empty());
    }

    #[test]
    fn attached_values() {
        let a = run(&["-flength>2", "--map=trim()"]);
        assert_eq!(a.filter.as_deref(), Some("length>2"));
        assert_eq!(a.map.as_deref(), Some("trim()"));
    }

    #[test]
    fn long_flags() {
        let a = run(&["--explicit", "--ignore", "--json", "--reduce", "sum"]);
        assert!(a.explicit && a.ignore_empty && a.json);
        assert_eq!(a.reduce.as_deref(), Some("sum"));
    }

    #[test]
    fn combined_bool_flags() {
        let a = run(&["-eij", "-m", "$"]);
        assert!(a.explicit && a.ignore_empty && a.json);
    }

    #[test]
    fn combined_flags_then_value() {
        let a = run(&["-ef", "$.length"]);
        assert!(a.explicit);
        assert_eq!(a.filter.as_deref(), Some("$.length"));
    }

    #[test]
    fn inputs() {
        let a = run(&["-r", "sum", "a.txt", "-", "b.txt"]);
        assert_eq!(
            a.inputs,
            vec![
                Input::File(PathBuf::from("a.txt")),
                Input::Stdin,
                Input::File(PathBuf::from("b.txt")),
            ]
        );
    }

    #[test]
    fn double_dash_ends_flags() {
        let a = run(&["-r", "sum", "--", "-odd-name"]);
        assert_eq!(a.inputs, vec![Input::File(PathBuf::from("-odd-name"))]);
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse_argv(&argv(&["-h"])), Ok(Command::Help));
        assert_eq!(parse_argv(&argv(&["--version"])), Ok(Command::Version));
    }

    #[test]
    fn missing_value() {
        assert!(parse_argv(&argv(&["-m"])).is_err());
        assert!(parse_argv(&argv(&["--filter"])).is_err());
    }

    #[test]
    fn repeated_stage() {
        assert!(parse_argv(&argv(&["-m", "a", "-m", "b"])).is_err());
    }

    #[test]
    fn unknown_flag() {
        assert!(parse_argv(&argv(&["-z"])).is_err());
        assert!(parse_argv(&argv(&["--zap"])).is_err());
    }
}
