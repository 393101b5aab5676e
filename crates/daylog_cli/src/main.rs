//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `daylog_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("daylog_core ping={}", daylog_core::ping());
    println!("daylog_core version={}", daylog_core::core_version());
}
