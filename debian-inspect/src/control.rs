// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Defines primitives in control files.

See <https://www.debian.org/doc/debian-policy/ch-controlfields.html>
for the canonical source of truth for how control files work.

Both the `control` file inside binary packages and `.dsc` source package
descriptions are parsed by [ControlParagraph::parse_str()] /
[ControlParagraph::parse_reader()].
*/

use {
    crate::error::{DebianError, Result},
    std::{
        fmt::{Display, Formatter},
        io::{BufRead, Write},
    },
};

/// A field in a control file.
///
/// The value holds the text after the colon. Continuation lines are joined
/// with `\n` and keep their leading whitespace.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ControlField {
    name: String,
    value: String,
}

impl ControlField {
    /// Construct an instance from a field name and value.
    pub fn new(name: impl ToString, value: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// The name of this field, as originally cased.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this field has the given name, compared case insensitively.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Obtain the value as a [&str].
    ///
    /// The value's original file formatting (including newlines and leading whitespace)
    /// is included.
    pub fn value_str(&self) -> &str {
        &self.value
    }

    /// Obtain an iterator of words in the value.
    pub fn iter_words(&self) -> impl Iterator<Item = &str> {
        self.value.split_ascii_whitespace()
    }

    /// Obtain an iterator of non-empty lines in the value.
    ///
    /// Leading whitespace from each line is stripped.
    pub fn iter_lines(&self) -> impl Iterator<Item = &str> {
        self.value
            .lines()
            .map(|x| x.trim_start())
            .filter(|x| !x.is_empty())
    }

    /// Write the contents of this field to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.to_string().as_bytes())
    }
}

impl Display for ControlField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.value.is_empty() || self.value.starts_with('\n') {
            writeln!(f, "{}:{}", self.name, self.value)
        } else {
            writeln!(f, "{}: {}", self.name, self.value)
        }
    }
}

/// A paragraph in a control file.
///
/// A paragraph is an ordered series of control fields.
///
/// Field names are case insensitive on read and case preserving on set.
///
/// Paragraphs can only contain a single occurrence of a field and this is enforced through
/// the mutation APIs.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ControlParagraph {
    fields: Vec<ControlField>,
}

impl ControlParagraph {
    /// Parse a paragraph from a string.
    pub fn parse_str(s: &str) -> Result<Self> {
        let mut parser = ControlFileParser::default();

        for line in s.lines() {
            parser.write_line(line)?;
        }

        parser.finish()
    }

    /// Parse a paragraph by reading lines from a reader until EOF.
    pub fn parse_reader<R: BufRead>(reader: &mut R) -> Result<Self> {
        let mut parser = ControlFileParser::default();

        loop {
            let mut line = String::new();

            // .read_line() indicates EOF by Ok(0).
            if reader.read_line(&mut line)? == 0 {
                break;
            }

            parser.write_line(&line)?;
        }

        parser.finish()
    }

    /// Whether the paragraph is empty.
    ///
    /// Empty is defined by the lack of any fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The number of fields in this paragraph.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Add a new field.
    ///
    /// Errors if a field with the same name (case insensitive compare) is already present.
    pub fn add_field(&mut self, field: ControlField) -> Result<()> {
        if self.has_field(&field.name) {
            Err(DebianError::ControlParse(format!(
                "duplicate field: {}",
                field.name
            )))
        } else {
            self.fields.push(field);
            Ok(())
        }
    }

    /// Set the value of a field via a [ControlField].
    ///
    /// If a field with the same name (case insensitive compare) already exists, its value
    /// is replaced in place. Otherwise the field is appended.
    pub fn set_field(&mut self, field: ControlField) {
        if let Some(existing) = self.fields.iter_mut().find(|f| f.is_named(&field.name)) {
            *existing = field;
        } else {
            self.fields.push(field);
        }
    }

    /// Whether a named field is present in this paragraph.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Iterate over fields in this paragraph.
    ///
    /// Iteration order is insertion order.
    pub fn iter_fields(&self) -> impl Iterator<Item = &ControlField> {
        self.fields.iter()
    }

    /// Obtain the field with a given name in this paragraph.
    pub fn field(&self, name: &str) -> Option<&ControlField> {
        self.fields.iter().find(|f| f.is_named(name))
    }

    /// Obtain the raw string value of the named field.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.value_str())
    }

    /// Obtain the raw string value of the named field or a fallback value.
    pub fn field_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.field_str(name).unwrap_or(default)
    }

    /// Obtain the raw string value of a field that must be present.
    pub fn required_field_str(&self, name: &str) -> Result<&str> {
        self.field_str(name)
            .ok_or_else(|| DebianError::ControlRequiredFieldMissing(name.to_string()))
    }

    /// Obtain an iterator of words in the named field.
    pub fn iter_field_words(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        self.field(name).map(|f| f.iter_words())
    }

    /// Obtain an iterator of non-empty lines in the named field.
    pub fn iter_field_lines(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        self.field(name).map(|f| f.iter_lines())
    }

    /// Obtain an iterator of comma delimited values in the named field.
    pub fn iter_field_comma_delimited(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        self.field_str(name).map(|v| {
            v.split(',')
                .map(|x| x.trim())
                .filter(|x| !x.is_empty())
        })
    }

    /// Serialize the paragraph to a writer.
    ///
    /// Each field is terminated by a newline. No blank line is written after the
    /// final field.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for field in &self.fields {
            field.write(writer)?;
        }

        Ok(())
    }
}

impl Display for ControlParagraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for field in &self.fields {
            write!(f, "{}", field)?;
        }

        Ok(())
    }
}

/// Holds parsing state for a control paragraph.
///
/// Instances are fed lines of text and produce a [ControlParagraph] once finished.
#[derive(Clone, Debug, Default)]
pub struct ControlFileParser {
    paragraph: ControlParagraph,
    field: Option<ControlField>,
    paragraph_ended: bool,
}

impl ControlFileParser {
    /// Write a line to the parser.
    ///
    /// The line may or may not carry its line terminator.
    ///
    /// `Err` is returned if the control data is invalid.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim_end_matches(&['\n', '\r'][..]);

        // Empty lines terminate the paragraph. Leading ones are ignored.
        if line.trim().is_empty() {
            self.flush_field()?;

            if !self.paragraph.is_empty() {
                self.paragraph_ended = true;
            }

            return Ok(());
        }

        if self.paragraph_ended {
            return Err(DebianError::ControlParse(format!(
                "unexpected content after end of paragraph: '{}'",
                line
            )));
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            let field = self.field.as_mut().ok_or_else(|| {
                DebianError::ControlParse(format!(
                    "continuation line without a preceding field: '{}'",
                    line
                ))
            })?;

            field.value.push('\n');
            field.value.push_str(line.trim_end());

            return Ok(());
        }

        self.flush_field()?;

        let (name, value) = line.split_once(':').ok_or_else(|| {
            DebianError::ControlParse(format!("error parsing line '{}'; missing colon", line))
        })?;

        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(DebianError::ControlParse(format!(
                "invalid field name in line '{}'",
                line
            )));
        }

        self.field = Some(ControlField::new(name, value.trim()));

        Ok(())
    }

    /// Finish parsing, consuming self.
    ///
    /// The returned paragraph is empty if no fields were seen.
    pub fn finish(mut self) -> Result<ControlParagraph> {
        self.flush_field()?;

        Ok(self.paragraph)
    }

    fn flush_field(&mut self) -> Result<()> {
        if let Some(field) = self.field.take() {
            self.paragraph.add_field(field)?;
        }

        Ok(())
    }
}
