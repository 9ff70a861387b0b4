// Loupe - Concurrency Debugger Front End
// Copyright (C) 2025 the Loupe contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Integration tests for the shared logging setup
//!
//! Only one subscriber can ever be installed per process, so these tests
//! run serialized and assert only what holds regardless of which of them
//! (or which other test binary) installed it first.

use std::env;

use loupe_common::{ensure_test_logging, init_logging};
use serial_test::serial;
use tracing::info;

fn component_log_dir(component: &str) -> std::path::PathBuf {
    env::temp_dir().join("loupe-logs").join(component)
}

#[test]
#[serial]
fn test_init_prepares_the_component_log_directory() {
    // The directory is prepared before the subscriber is installed, so it
    // exists even when another test already won the installation race.
    let _ = init_logging("itest-display", true);

    assert!(component_log_dir("itest-display").exists());
}

#[test]
#[serial]
fn test_second_init_in_the_same_process_is_rejected() {
    ensure_test_logging(None);
    info!("Testing repeated logging initialization");

    let result = init_logging("itest-repeat", true);

    assert!(result.is_err());
    assert!(component_log_dir("itest-repeat").exists());
}

#[test]
#[serial]
fn test_test_logging_is_idempotent() {
    ensure_test_logging(None);
    ensure_test_logging(None);

    // Logging through the installed subscriber must not panic.
    info!("Testing idempotent test logging setup");
}
