// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Phase-event hooks for memory instrumentation.
//!
//! Compiled with the `mem-monitor` feature, [`event`] emits a timestamped
//! phase marker (with the current resident-set size where `/proc` is
//! available) that an external profiler can correlate with its allocation
//! trace. Without the feature every call disappears at compile time, so the
//! core stays silent.

/// Record a named phase boundary.
#[cfg(feature = "mem-monitor")]
pub fn event(name: &str) {
    eprintln!("[mem] {name}{}", rss_suffix());
}

/// Record a named phase boundary (no-op without `mem-monitor`).
#[cfg(not(feature = "mem-monitor"))]
#[inline(always)]
pub fn event(_name: &str) {}

#[cfg(feature = "mem-monitor")]
fn rss_suffix() -> String {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            for line in status.lines() {
                if let Some(kb) = line.strip_prefix("VmRSS:") {
                    return format!(" rss={}", kb.trim());
                }
            }
        }
    }
    String::new()
}
