// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Inspection of Debian packaging artifacts.

This crate reads Debian binary packages (`.deb` files) and source package descriptions
(`.dsc` files) without depending on `dpkg`, `apt` or any other native Debian tooling.

# Goals

## Compliance

Version ordering follows the algorithm described by the
[Debian Policy Manual](https://www.debian.org/doc/debian-policy/ch-controlfields.html#version)
exactly. Container parsing makes no assumptions about the order of `.deb` members or about
which compression a packaging toolchain chose for them.

## Bounded Resource Use

Everything is synchronous and single-threaded. Content digests are computed by streaming
files in fixed size chunks. Only the (small) control member of a `.deb` is buffered in
memory. The data member is skipped without being read into memory.

# A Tour of Functionality

A `.deb` file defines a binary package. [binary_package::BinaryPackage] is a handle to a
`.deb` on the filesystem. It lazily extracts the package's control data and computes
the file's MD5, SHA-1 and SHA-256 digests, caching both for the lifetime of the handle.

The lower level [deb] module parses the `ar` container of `.deb` files.
[deb::reader::BinaryPackageReader] iterates the archive members and
[deb::reader::resolve_control_text()] locates and decompresses the `control.tar` member
(uncompressed, gzip, xz and zstd are supported) and returns the text of its `control` file.

A common primitive within Debian packaging is *control files*. These consist of *fields*
of key-value metadata. The [control] module parses and renders them.
[control::ControlParagraph] is an ordered collection of [control::ControlField] with
case-insensitive lookups. [binary_package_control::BinaryPackageControlFile] and
[debian_source_control::DebianSourceControlFile] wrap a paragraph with accessors for
well-known fields of binary packages and `.dsc` files, respectively.

The [package_version] module implements Debian package version string parsing,
serialization, and comparison. [package_version::PackageVersion] is the main type used for
this. [package_version::compare_versions()] compares strings directly.

The [source_package] module validates source packages.
[source_package::SourcePackage] parses a `.dsc` file (optionally wrapped in a PGP cleartext
signature, which is parsed but not verified; see [pgp]), enumerates the files it
references and checks that they exist and have the declared digests.

[io] holds the content digest primitives shared by the above.
*/

pub mod binary_package;
pub mod binary_package_control;
pub mod control;
pub mod deb;
pub mod debian_source_control;
pub mod error;
pub mod io;
pub mod package_version;
pub mod pgp;
pub mod source_package;

#[cfg(test)]
mod testutil;
