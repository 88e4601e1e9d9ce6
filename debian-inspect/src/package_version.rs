// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Debian package version string handling. */

use {
    std::{
        cmp::Ordering,
        fmt::{Display, Formatter},
        num::ParseIntError,
        str::FromStr,
    },
    thiserror::Error,
};

#[derive(Clone, Debug, Error)]
pub enum VersionError {
    #[error("the epoch component is out of range: {0}")]
    EpochOutOfRange(#[from] ParseIntError),

    #[error("the epoch component has non-digit characters: {0}")]
    EpochNonNumeric(String),
}

pub type Result<T> = std::result::Result<T, VersionError>;

/// A Debian package version.
///
/// Debian package versions consist of multiple sub-components and have rules about
/// sorting. The semantics are defined at
/// <https://www.debian.org/doc/debian-policy/ch-controlfields.html#version>.
///
/// The concise version is the format is `[epoch:]upstream_version[-debian_revision]`.
/// Only the epoch is validated: any other text is accepted, since versions seen in the
/// wild do not always follow the character rules policy sets for them.
///
/// Equality and ordering follow Debian semantics, so `1.0` and `0:1.00-0` compare equal
/// even though they render differently.
#[derive(Clone, Debug)]
pub struct PackageVersion {
    epoch: Option<u32>,
    upstream_version: String,
    debian_revision: Option<String>,
}

impl PackageVersion {
    /// Construct an instance by parsing a version string.
    pub fn parse(s: &str) -> Result<Self> {
        // Epoch is the part before the first colon, if present.
        // upstream_version and debian_revision are discovered by splitting on last hyphen.

        let (epoch, remainder) = if let Some(pos) = s.find(':') {
            (Some(&s[0..pos]), &s[pos + 1..])
        } else {
            (None, s)
        };

        let (upstream, debian) = if let Some(pos) = remainder.rfind('-') {
            (&remainder[0..pos], Some(&remainder[pos + 1..]))
        } else {
            (remainder, None)
        };

        let epoch = if let Some(epoch) = epoch {
            if epoch.is_empty() || !epoch.chars().all(|c| c.is_ascii_digit()) {
                return Err(VersionError::EpochNonNumeric(s.to_string()));
            }

            Some(u32::from_str(epoch)?)
        } else {
            None
        };

        Ok(Self {
            epoch,
            upstream_version: upstream.to_string(),
            debian_revision: debian.map(|x| x.to_string()),
        })
    }

    /// The `epoch` component of the version string.
    ///
    /// Only `Some` if present or defined explicitly.
    pub fn epoch(&self) -> Option<u32> {
        self.epoch
    }

    /// Assumed value of `epoch` component.
    ///
    /// If the component isn't explicitly defined, a default of `0` will be assumed.
    pub fn epoch_assumed(&self) -> u32 {
        self.epoch.unwrap_or(0)
    }

    /// `upstream` component of the version string.
    ///
    /// This is the main part of the version number.
    ///
    /// It is typically the original version of the software from which this package came. Although
    /// it may be massaged to be compatible with packaging requirements.
    pub fn upstream_version(&self) -> &str {
        &self.upstream_version
    }

    /// `debian_revision` component of the version string.
    ///
    /// The part of the version string that specifies the version of the Debian package based on
    /// the upstream version. `None` when the version has no hyphen, which sorts the same as an
    /// empty revision.
    pub fn debian_revision(&self) -> Option<&str> {
        self.debian_revision.as_deref()
    }
}

impl FromStr for PackageVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Display for PackageVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // [epoch:]upstream_version[-debian_revision]
        if let Some(epoch) = self.epoch {
            write!(f, "{}:", epoch)?;
        }

        f.write_str(&self.upstream_version)?;

        if let Some(revision) = &self.debian_revision {
            write!(f, "-{}", revision)?;
        }

        Ok(())
    }
}

/// Split a string before its first digit.
///
/// Returns the leading run of non-digits and everything else afterwards.
/// Either value can be an empty string.
fn split_first_digit(s: &str) -> (&str, &str) {
    s.split_at(s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len()))
}

/// Split a string before its first non-digit.
fn split_first_nondigit(s: &str) -> (&str, &str) {
    s.split_at(s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len()))
}

/// Sort weight of a character in a non-digit run.
///
/// Tildes sort before everything, including the end of the run (weight 0). Letters sort
/// before all other characters.
fn lexical_order(c: char) -> i64 {
    match c {
        '~' => -1,
        c if c.is_ascii_alphabetic() => c as i64,
        c => c as i64 + 256,
    }
}

fn lexical_compare(a: &str, b: &str) -> Ordering {
    // The lexical comparison is a comparison of ASCII values modified so that all the letters sort
    // earlier than all the non-letters and so that a tilde sorts before anything, even the end of a
    // part.
    let mut a_chars = a.chars().map(lexical_order);
    let mut b_chars = b.chars().map(lexical_order);

    loop {
        match (a_chars.next(), b_chars.next()) {
            (None, None) => return Ordering::Equal,
            (a_weight, b_weight) => match a_weight.unwrap_or(0).cmp(&b_weight.unwrap_or(0)) {
                Ordering::Equal => {}
                res => return res,
            },
        }
    }
}

/// Compare two runs of digits numerically.
///
/// An empty run counts as zero. Runs are compared as text after dropping leading zeros,
/// so arbitrarily long runs cannot overflow.
fn numeric_compare(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');

    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compare a version component string using Debian rules.
fn compare_component(a: &str, b: &str) -> Ordering {
    // The comparison consists of iterations of a 2 step process until both inputs are exhausted.
    //
    // Step 1: Initial part of each string consisting of non-digit characters is compared using
    // a custom lexical sort.
    //
    // Step 2: Initial part of remaining string consisting of digit characters is compared using
    // numerical sort.
    let mut a_remaining = a;
    let mut b_remaining = b;

    loop {
        let (a_leading_nondigit, a_rest) = split_first_digit(a_remaining);
        let (b_leading_nondigit, b_rest) = split_first_digit(b_remaining);

        match lexical_compare(a_leading_nondigit, b_leading_nondigit) {
            Ordering::Equal => {}
            res => {
                return res;
            }
        }

        let (a_digits, a_rest) = split_first_nondigit(a_rest);
        let (b_digits, b_rest) = split_first_nondigit(b_rest);

        match numeric_compare(a_digits, b_digits) {
            Ordering::Equal => {}
            res => {
                return res;
            }
        }

        a_remaining = a_rest;
        b_remaining = b_rest;

        if a_remaining.is_empty() && b_remaining.is_empty() {
            return Ordering::Equal;
        }
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl PartialOrd<Self> for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // Epoch is compared numerically. Then upstream and debian components are compared
        // using a custom algorithm. The absence of a debian revision is equivalent to an
        // empty one.
        self.epoch_assumed()
            .cmp(&other.epoch_assumed())
            .then_with(|| compare_component(&self.upstream_version, &other.upstream_version))
            .then_with(|| {
                compare_component(
                    self.debian_revision().unwrap_or(""),
                    other.debian_revision().unwrap_or(""),
                )
            })
    }
}

/// Compare two version strings using Debian rules.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    Ok(PackageVersion::parse(a)?.cmp(&PackageVersion::parse(b)?))
}

/// Obtain a totally ordered sort key for a version string.
///
/// Ordering keys is equivalent to ordering the strings with [compare_versions()].
pub fn sort_key(version: &str) -> Result<PackageVersion> {
    PackageVersion::parse(version)
}

/// Sort version strings in ascending Debian order.
///
/// All values are parsed before sorting, so an error leaves nothing half sorted.
/// The sort is stable: values comparing equal keep their relative order.
pub fn sort_version_strings<S: AsRef<str>>(values: impl IntoIterator<Item = S>) -> Result<Vec<S>> {
    let mut keyed = values
        .into_iter()
        .map(|v| Ok((sort_key(v.as_ref())?, v)))
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(keyed.into_iter().map(|(_, v)| v).collect())
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_structure(v: &PackageVersion, epoch: Option<u32>, upstream: &str, debian: Option<&str>) {
        assert_eq!(v.epoch(), epoch);
        assert_eq!(v.upstream_version(), upstream);
        assert_eq!(v.debian_revision(), debian);
    }

    #[test]
    fn parse() -> Result<()> {
        assert_structure(
            &PackageVersion::parse("1:4.7.0+dfsg1-2")?,
            Some(1),
            "4.7.0+dfsg1",
            Some("2"),
        );
        assert_structure(
            &PackageVersion::parse("3.3.2.final~github")?,
            None,
            "3.3.2.final~github",
            None,
        );
        assert_structure(
            &PackageVersion::parse("3.3.2.final~github-2")?,
            None,
            "3.3.2.final~github",
            Some("2"),
        );
        assert_structure(
            &PackageVersion::parse("0.18.0+dfsg-2+b1")?,
            None,
            "0.18.0+dfsg",
            Some("2+b1"),
        );
        assert_structure(&PackageVersion::parse("foo-bar-baz")?, None, "foo-bar", Some("baz"));
        assert_structure(&PackageVersion::parse("0:0.0-00")?, Some(0), "0.0", Some("00"));
        assert_structure(&PackageVersion::parse("1:2:3")?, Some(1), "2:3", None);
        assert_structure(&PackageVersion::parse("1.0-")?, None, "1.0", Some(""));

        Ok(())
    }

    #[test]
    fn parse_epoch_errors() {
        assert!(matches!(
            PackageVersion::parse("1a:0"),
            Err(VersionError::EpochNonNumeric(_))
        ));
        assert!(matches!(
            PackageVersion::parse(":1.0"),
            Err(VersionError::EpochNonNumeric(_))
        ));
        assert!(matches!(
            PackageVersion::parse("-1:1.0"),
            Err(VersionError::EpochNonNumeric(_))
        ));
        assert!(matches!(
            PackageVersion::parse("99999999999:1.0"),
            Err(VersionError::EpochOutOfRange(_))
        ));
        assert!(compare_versions("1.0", "x:1.0").is_err());
    }

    #[test]
    fn format() -> Result<()> {
        for s in ["1:4.7.0+dfsg1-2", "3.3.2.final~github", "0.18.0+dfsg-2+b1", "0:1.0-"] {
            let v = PackageVersion::parse(s)?;
            assert_eq!(format!("{}", v), s);
        }

        Ok(())
    }

    #[test]
    fn test_lexical_compare() {
        assert_eq!(lexical_compare("~~", "~~a"), Ordering::Less);
        assert_eq!(lexical_compare("~~a", "~~"), Ordering::Greater);
        assert_eq!(lexical_compare("~~a", "~"), Ordering::Less);
        assert_eq!(lexical_compare("~", "~~a"), Ordering::Greater);
        assert_eq!(lexical_compare("~", ""), Ordering::Less);
        assert_eq!(lexical_compare("", "~"), Ordering::Greater);
        assert_eq!(lexical_compare("", "a"), Ordering::Less);
        assert_eq!(lexical_compare("a", ""), Ordering::Greater);
        assert_eq!(lexical_compare("~", "."), Ordering::Less);
        assert_eq!(lexical_compare("~", "a"), Ordering::Less);
        assert_eq!(lexical_compare("a", "."), Ordering::Less);
        assert_eq!(lexical_compare(".", "a"), Ordering::Greater);
        assert_eq!(lexical_compare(".", "~"), Ordering::Greater);
        assert_eq!(lexical_compare("+", "."), Ordering::Less);
        assert_eq!(lexical_compare("Z", "a"), Ordering::Less);
        assert_eq!(lexical_compare("a.", "a+"), Ordering::Greater);
        assert_eq!(lexical_compare("ab", "a."), Ordering::Less);
        assert_eq!(lexical_compare(".", "."), Ordering::Equal);

        let mut values = vec!["a", "", "~", "~~a", "~~"];
        values.sort_by(|a, b| lexical_compare(a, b));
        assert_eq!(values, vec!["~~", "~~a", "~", "", "a"]);
    }

    #[test]
    fn test_numeric_compare() {
        assert_eq!(numeric_compare("", "0"), Ordering::Equal);
        assert_eq!(numeric_compare("007", "7"), Ordering::Equal);
        assert_eq!(numeric_compare("9", "10"), Ordering::Less);
        assert_eq!(
            numeric_compare("123456789012345678901234567890", "99999999999999999999"),
            Ordering::Greater
        );
    }

    #[test]
    fn test_compare_component() {
        assert_eq!(
            compare_component("1.0~beta1~svn1245", "1.0~beta1"),
            Ordering::Less
        );
        assert_eq!(compare_component("1.0~beta1", "1.0"), Ordering::Less);

        assert_eq!(compare_component("0", "00"), Ordering::Equal);
        assert_eq!(compare_component("00.0.9", "0.0.9"), Ordering::Equal);
        assert_eq!(compare_component("0.00.9-foo", "0.0.9-foo"), Ordering::Equal);
        assert_eq!(compare_component("0.0.9-1.00foo", "0.0.9-1.0foo"), Ordering::Equal);

        assert_eq!(compare_component("0.0.9", "0.0.10"), Ordering::Less);
        assert_eq!(compare_component("0.0.9-foo", "0.0.10-goo"), Ordering::Less);
        assert_eq!(compare_component("0.0.9-foo", "0.0.9-goo"), Ordering::Less);
        assert_eq!(compare_component("0.0.9-1.0foo", "0.0.9-1.1foo"), Ordering::Less);
        assert_eq!(compare_component("1.0", "1.0.0"), Ordering::Less);
        assert_eq!(compare_component("1.0", "1.0~"), Ordering::Greater);

        assert_eq!(compare_component("0.0.10-foo", "0.0.9-goo"), Ordering::Greater);
        assert_eq!(compare_component("0.0.9-1.0foo", "0.0.9-1.0bar"), Ordering::Greater);
    }

    #[test]
    fn compare_version() -> Result<()> {
        let cases = [
            // An omitted epoch is zero.
            ("0.0.0", "0:0.0.0", Ordering::Equal),
            ("0:0.0.0-foo", "0.0.0-foo", Ordering::Equal),
            // An omitted revision is equivalent to 0.
            ("0.0.0", "0.0.0-0", Ordering::Equal),
            ("0.0.0", "0.0.0-00", Ordering::Equal),
            ("0.0.0-0", "0:0.0.0", Ordering::Equal),
            ("2:0.0.0-1", "2:0.0.0-1", Ordering::Equal),
            ("0:a.0.0-foo", "0:a.0.0-foo", Ordering::Equal),
            ("0.0.0-0", "0:0.0.1", Ordering::Less),
            ("0.0.0-0", "0:0.0.0-a", Ordering::Less),
            ("0.0.0-0", "0:0.0.0-1", Ordering::Less),
            ("0.9.0", "0.10.0", Ordering::Less),
            ("9.0.0", "10.0.0", Ordering::Less),
            ("1.0", "1:1.0", Ordering::Less),
            ("1.0~rc1", "1.0", Ordering::Less),
            ("1.0-test1", "1.0-test2", Ordering::Less),
            ("1:0.1", "0:99.0", Ordering::Greater),
            ("0.0.0-a", "0:0.0.0-1", Ordering::Greater),
            ("2:0.0.44-nobin", "2:0.0.44-1", Ordering::Greater),
            ("2:0.0.44-1", "2:0.0.44-nobin", Ordering::Less),
        ];

        for (a, b, expected) in cases {
            assert_eq!(compare_versions(a, b)?, expected, "{} vs {}", a, b);
            assert_eq!(compare_versions(b, a)?, expected.reverse(), "{} vs {}", b, a);
            assert_eq!(compare_versions(a, a)?, Ordering::Equal);
        }

        Ok(())
    }

    #[test]
    fn ordering_is_transitive() -> Result<()> {
        let chain = [
            "1.0~~", "1.0~~a", "1.0~", "1.0", "1.0a", "1.0+", "1.0.1", "1.1~rc1", "1.1", "1:0.1",
        ];

        for (i, a) in chain.iter().enumerate() {
            for (j, b) in chain.iter().enumerate() {
                assert_eq!(compare_versions(a, b)?, i.cmp(&j), "{} vs {}", a, b);
            }
        }

        Ok(())
    }

    #[test]
    fn sorting() -> Result<()> {
        assert_eq!(
            sort_version_strings(["0:1.0-test1", "1:0.0-test0", "0:1.0-test2"])?,
            vec!["0:1.0-test1", "0:1.0-test2", "1:0.0-test0"]
        );

        let mut keys = ["1.0-2", "1.0~rc1", "0:1.0", "1.0-10"]
            .iter()
            .map(|v| sort_key(v))
            .collect::<Result<Vec<_>>>()?;
        keys.sort();
        assert_eq!(
            keys.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
            vec!["1.0~rc1", "0:1.0", "1.0-2", "1.0-10"]
        );

        assert!(sort_version_strings(vec!["1.0".to_string(), "a:1".to_string()]).is_err());

        Ok(())
    }
}
