// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    clap::{Arg, ArgMatches, Command},
    debian_inspect::{
        binary_package::BinaryPackage,
        error::DebianError,
        package_version::{compare_versions, sort_version_strings},
        source_package::SourcePackage,
    },
    log::{debug, warn, LevelFilter},
    std::cmp::Ordering,
    thiserror::Error,
};

const DEB_ABOUT: &str = "\
Print metadata of .deb files.

Each argument is a path or a glob pattern. For each matching file, its size,
MD5, SHA1 and SHA256 digests are printed along with the fields of the
`control` file embedded in the package.

Matches that are not regular files are skipped with a warning.

By default, packages whose control file lacks any of the Package, Version or
Architecture fields are rejected. Pass --ignore-missing-fields to inspect them
anyway.
";

const COMPARE_ABOUT: &str = "\
Compare two Debian version strings.

Prints `<` if the first version is older than the second, `>` if it is
newer and `=` if both versions are equivalent. Equivalent versions need not
be identical strings: `1.0` and `0:1.0-0` are equivalent.
";

const DSC_ABOUT: &str = "\
Validate a source package described by a .dsc file.

The files listed by the .dsc are resolved relative to the directory holding
the .dsc. The command fails if any file is missing or if any file's content
does not match one of its declared MD5, SHA1 or SHA256 digests. All missing
files, or all incorrect digests, are printed before failing.

.dsc files wrapped in a PGP cleartext signature are accepted. The signature is
NOT verified.
";

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("argument parsing error: {0:?}")]
    Clap(#[from] clap::Error),

    #[error("{0}")]
    Debian(#[from] DebianError),

    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    #[error("bad glob pattern: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("glob error: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid sub-command: {0}")]
    InvalidSubCommand(String),
}

pub type Result<T> = std::result::Result<T, InspectError>;

fn ordering_symbol(ordering: Ordering) -> &'static str {
    match ordering {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_binary_package(package: &BinaryPackage) -> Result<String> {
    Ok(format!(
        "Filename: {}\nSize:     {}\nMD5:      {}\nSHA1:     {}\nSHA256:   {}\nHeaders:\n{}",
        package.path().display(),
        package.size()?,
        package.md5()?,
        package.sha1()?,
        package.sha256()?,
        indent(&package.control_str()?, "  ")
    ))
}

pub fn run_cli() -> Result<()> {
    let app = Command::new("Debian package inspector")
        .version(env!("CARGO_PKG_VERSION"))
        .author("debian-inspect contributors")
        .about("Inspect Debian binary and source packages")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .multiple_occurrences(true)
                .help("Increase logging verbosity. Can be specified multiple times."),
        );

    let app = app.subcommand(
        Command::new("deb")
            .about("Print metadata of .deb files")
            .long_about(DEB_ABOUT)
            .arg(
                Arg::new("ignore-missing-fields")
                    .long("ignore-missing-fields")
                    .help("Do not require Package, Version and Architecture fields"),
            )
            .arg(
                Arg::new("path")
                    .required(true)
                    .multiple_values(true)
                    .help("Paths or glob patterns of .deb files"),
            ),
    );

    let app = app.subcommand(
        Command::new("compare")
            .about("Compare two Debian version strings")
            .long_about(COMPARE_ABOUT)
            .arg(
                Arg::new("a")
                    .required(true)
                    .allow_hyphen_values(true)
                    .help("First version"),
            )
            .arg(
                Arg::new("b")
                    .required(true)
                    .allow_hyphen_values(true)
                    .help("Second version"),
            ),
    );

    let app = app.subcommand(
        Command::new("sort")
            .about("Print Debian version strings in ascending order")
            .arg(
                Arg::new("version")
                    .required(true)
                    .multiple_values(true)
                    .allow_hyphen_values(true)
                    .help("Versions to sort"),
            ),
    );

    let app = app.subcommand(
        Command::new("dsc")
            .about("Validate the files of a source package")
            .long_about(DSC_ABOUT)
            .arg(
                Arg::new("path")
                    .required(true)
                    .allow_invalid_utf8(true)
                    .help("Path to a .dsc file"),
            ),
    );

    let matches = app.get_matches();

    let log_level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    );

    // Disable log context except at higher log levels.
    if log_level <= LevelFilter::Info {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }

    builder.init();

    match matches.subcommand() {
        Some(("deb", args)) => command_deb(args),
        Some(("compare", args)) => command_compare(args),
        Some(("sort", args)) => command_sort(args),
        Some(("dsc", args)) => command_dsc(args),
        Some((command, _)) => Err(InspectError::InvalidSubCommand(command.to_string())),
        None => Err(InspectError::MissingArgument("sub-command")),
    }
}

fn command_deb(args: &ArgMatches) -> Result<()> {
    let ignore_missing_fields = args.is_present("ignore-missing-fields");

    for pattern in args.values_of("path").into_iter().flatten() {
        let mut matched = false;

        for path in glob::glob(pattern)? {
            let path = path?;
            matched = true;

            if !path.is_file() {
                warn!("{} is not a file; skipping", path.display());
                continue;
            }

            debug!("checking {}", path.display());

            let package = BinaryPackage::open(&path)?.ignore_missing_fields(ignore_missing_fields);
            println!("{}", format_binary_package(&package)?);
        }

        if !matched {
            warn!("{} did not match any files", pattern);
        }
    }

    Ok(())
}

fn command_compare(args: &ArgMatches) -> Result<()> {
    let a = args.value_of("a").ok_or(InspectError::MissingArgument("a"))?;
    let b = args.value_of("b").ok_or(InspectError::MissingArgument("b"))?;

    let ordering = compare_versions(a, b).map_err(DebianError::from)?;
    println!("{}", ordering_symbol(ordering));

    Ok(())
}

fn command_sort(args: &ArgMatches) -> Result<()> {
    let versions = sort_version_strings(args.values_of("version").into_iter().flatten())
        .map_err(DebianError::from)?;

    for version in versions {
        println!("{}", version);
    }

    Ok(())
}

fn command_dsc(args: &ArgMatches) -> Result<()> {
    let path = args
        .value_of_os("path")
        .ok_or(InspectError::MissingArgument("path"))?;

    let package = SourcePackage::open(path)?;

    println!("Source:  {}", package.field_or("Source", "<unknown>"));
    println!("Version: {}", package.field_or("Version", "<unknown>"));
    match package.signatures() {
        Some(signatures) => println!(
            "Signed:  yes ({} signature(s), not verified)",
            signatures.iter_signatures().count()
        ),
        None => println!("Signed:  no"),
    }
    println!("Files:");
    for file in package.files() {
        println!("  {} ({} bytes)", file.filename, file.size);
        for (checksum, digest) in &file.digests {
            println!("    {:<6} {}", checksum, digest);
        }
    }

    if let Err(err) = package.validate() {
        match &err {
            DebianError::SourceFilesMissing(missing) => {
                println!("Missing files:");
                for path in missing {
                    println!("  {}", path.display());
                }
            }
            DebianError::SourceChecksumMismatch(corrected) => {
                println!("Incorrect checksums (actual values):");
                for (checksum, files) in corrected {
                    for (filename, digest) in files {
                        println!("  {:<6} {} {}", checksum, digest, filename);
                    }
                }
            }
            _ => {}
        }

        return Err(err.into());
    }

    println!("All files present with correct checksums");

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn symbols() {
        assert_eq!(ordering_symbol(Ordering::Less), "<");
        assert_eq!(ordering_symbol(Ordering::Equal), "=");
        assert_eq!(ordering_symbol(Ordering::Greater), ">");
    }

    #[test]
    fn indent_lines() {
        assert_eq!(indent("A: b\nC:\n d\n", "  "), "  A: b\n  C:\n   d");
        assert_eq!(indent("", "  "), "");
    }
}
