// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use path_clean::clean;
use std::path::{Path, PathBuf};

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

/// Walks from `start` up to the filesystem root looking for `filename`.
pub fn find_in_parent(start: &Path, filename: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(filename))
        .find(|candidate| candidate.is_file())
}

/// Picks the configuration file: an explicit path wins (relative paths are
/// taken from `cwd`), then the nearest file named `default_filename` above
/// `cwd`, then the one in `default_config_dir`.
pub fn resolve_config_path(
    find: FindInParent,
    cwd: PathBuf,
    default_config_dir: PathBuf,
    default_filename: &str,
    cli_file: Option<PathBuf>,
) -> PathBuf {
    match cli_file {
        Some(file) if file.is_absolute() => file,
        Some(file) => clean(cwd.join(file)),
        None => find(&cwd, default_filename)
            .unwrap_or_else(|| clean(default_config_dir.join(default_filename))),
    }
}
