//! Tokenizing and applying the flag strings embedded in interface files.

use crate::error::ArgsError;
use crate::options::BuildOptions;
use crate::types::OptLevel;
use std::path::PathBuf;

/// Splits a command line into arguments using GNU shell conventions.
///
/// Arguments are separated by unquoted whitespace. Single quotes preserve
/// everything literally; double quotes preserve whitespace but still honour
/// backslash escapes; outside quotes a backslash escapes the next character.
pub fn tokenize_command_line(line: &str) -> Result<Vec<String>, ArgsError> {
    let mut args = Vec::new();
    let mut current = String::new();
    // Distinguishes `''` (an empty argument) from no argument at all.
    let mut in_arg = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            '\\' => {
                current.push(chars.next().ok_or(ArgsError::TrailingEscape)?);
                in_arg = true;
            }
            '\'' => {
                in_arg = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(q) => current.push(q),
                        None => return Err(ArgsError::UnterminatedQuote('\'')),
                    }
                }
            }
            '"' => {
                in_arg = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => {
                            current.push(chars.next().ok_or(ArgsError::UnterminatedQuote('"'))?)
                        }
                        Some(q) => current.push(q),
                        None => return Err(ArgsError::UnterminatedQuote('"')),
                    }
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

/// Applies tokenized module flags to `opts`, overriding what is already set.
///
/// Search paths and conditional flags accumulate; every other flag replaces
/// the previous value.
pub fn parse_args<S: AsRef<str>>(args: &[S], opts: &mut BuildOptions) -> Result<(), ArgsError> {
    let mut iter = args.iter().map(|s| s.as_ref());

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .map(str::to_string)
                .ok_or_else(|| ArgsError::MissingValue(flag.to_string()))
        };

        match arg {
            "-module-name" => opts.module_name = value(arg)?,
            "-module-link-name" => opts.module_link_name = Some(value(arg)?),
            "-target" => opts.target_triple = value(arg)?,
            "-sdk" => opts.sdk_path = Some(PathBuf::from(value(arg)?)),
            "-resource-dir" => opts.resource_dir = Some(PathBuf::from(value(arg)?)),
            "-language-version" => opts.language_version = Some(value(arg)?),
            "-I" => opts.import_search_paths.push(PathBuf::from(value(arg)?)),
            "-F" => opts.framework_search_paths.push(PathBuf::from(value(arg)?)),
            "-D" => opts.conditional_flags.push(value(arg)?),
            "-O" => opts.optimization = OptLevel::Speed,
            "-Onone" => opts.optimization = OptLevel::None,
            "-Osize" => opts.optimization = OptLevel::Size,
            "-enable-library-evolution" => opts.library_evolution = true,
            "-enable-testing" => opts.enable_testing = true,
            "-debugger-support" => opts.debugger_support = true,
            joined if joined.len() > 2 && joined.starts_with("-I") => {
                opts.import_search_paths.push(PathBuf::from(&joined[2..]));
            }
            joined if joined.len() > 2 && joined.starts_with("-F") => {
                opts.framework_search_paths.push(PathBuf::from(&joined[2..]));
            }
            joined if joined.len() > 2 && joined.starts_with("-D") => {
                opts.conditional_flags.push(joined[2..].to_string());
            }
            flag if flag.starts_with('-') => return Err(ArgsError::UnknownFlag(flag.to_string())),
            other => return Err(ArgsError::UnexpectedArgument(other.to_string())),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tok(s: &str) -> Vec<String> {
        tokenize_command_line(s).unwrap()
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(tok("  -module-name   Foo\t-O "), ["-module-name", "Foo", "-O"]);
        assert!(tok("").is_empty());
        assert!(tok("   ").is_empty());
    }

    #[test]
    fn respects_quotes_and_escapes() {
        assert_eq!(tok(r#"-I "/path with/spaces""#), ["-I", "/path with/spaces"]);
        assert_eq!(tok(r"-I '/a b/\c'"), ["-I", r"/a b/\c"]);
        assert_eq!(tok(r"-I /a\ b"), ["-I", "/a b"]);
        assert_eq!(tok(r#""say \"hi\"""#), [r#"say "hi""#]);
        assert_eq!(tok(r#"pre"mid"'post'"#), ["premidpost"]);
    }

    #[test]
    fn empty_quotes_make_empty_argument() {
        assert_eq!(tok("-D ''"), ["-D", ""]);
    }

    #[test]
    fn unterminated_quotes_error() {
        assert_eq!(
            tokenize_command_line("-I \"/open"),
            Err(ArgsError::UnterminatedQuote('"'))
        );
        assert_eq!(
            tokenize_command_line("-I '/open"),
            Err(ArgsError::UnterminatedQuote('\''))
        );
        assert_eq!(tokenize_command_line("-O \\"), Err(ArgsError::TrailingEscape));
    }

    #[test]
    fn parse_overrides_options() {
        let mut opts = BuildOptions {
            module_name: "Foo".to_string(),
            target_triple: "x86_64-unknown-linux".to_string(),
            ..BuildOptions::default()
        };
        let args = tok(
            "-target arm64-apple-macos13 -enable-library-evolution -Osize \
             -module-name Foo -module-link-name FooCore -language-version 5",
        );
        parse_args(&args, &mut opts).unwrap();
        assert_eq!(opts.target_triple, "arm64-apple-macos13");
        assert!(opts.library_evolution);
        assert_eq!(opts.optimization, OptLevel::Size);
        assert_eq!(opts.module_link_name.as_deref(), Some("FooCore"));
        assert_eq!(opts.language_version.as_deref(), Some("5"));
    }

    #[test]
    fn parse_accumulates_paths_and_defines() {
        let mut opts = BuildOptions {
            import_search_paths: vec![PathBuf::from("host")],
            ..BuildOptions::default()
        };
        parse_args(&["-I", "a", "-Ib", "-Ffw", "-D", "DEBUG", "-DTRACE"], &mut opts).unwrap();
        assert_eq!(
            opts.import_search_paths,
            vec![PathBuf::from("host"), PathBuf::from("a"), PathBuf::from("b")]
        );
        assert_eq!(opts.framework_search_paths, vec![PathBuf::from("fw")]);
        assert_eq!(opts.conditional_flags, ["DEBUG", "TRACE"]);
    }

    #[test]
    fn parse_rejects_bad_input() {
        let mut opts = BuildOptions::default();
        assert_eq!(
            parse_args(&["-frobnicate"], &mut opts),
            Err(ArgsError::UnknownFlag("-frobnicate".to_string()))
        );
        assert_eq!(
            parse_args(&["-module-name"], &mut opts),
            Err(ArgsError::MissingValue("-module-name".to_string()))
        );
        assert_eq!(
            parse_args(&["Foo.source"], &mut opts),
            Err(ArgsError::UnexpectedArgument("Foo.source".to_string()))
        );
    }

    proptest! {
        #[test]
        fn plain_words_survive_any_spacing(
            words in proptest::collection::vec("[A-Za-z0-9_./-]{1,12}", 0..8),
            sep in "[ \t]{1,4}",
        ) {
            let line = words.join(&sep);
            prop_assert_eq!(tokenize_command_line(&line).unwrap(), words);
        }
    }
}
