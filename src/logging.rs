// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Logging macros.
//!
//! | Build | Backend |
//! | ----- | ------- |
//! | firmware (`target_os = "none"`) | `defmt`, transported over RTT by `defmt-rtt` |
//! | host tests | `println!` / `eprintln!` |
//! | host non-test | compiled out |
//!
//! Format strings must stay within the subset both backends accept: plain `{}` placeholders
//! with integers, floats, `bool` and `&str` arguments.

/// Log an informational message.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(target_os = "none")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(target_os = "none"), test))]
        println!("[INFO] {}", format!($($arg)*));
    }};
}

/// Log a warning.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(target_os = "none")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(target_os = "none"), test))]
        println!("[WARN] {}", format!($($arg)*));
    }};
}

/// Log an error.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(target_os = "none")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(target_os = "none"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));
    }};
}

/// Log a debug message.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(target_os = "none")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(target_os = "none"), test))]
        println!("[DEBUG] {}", format!($($arg)*));
    }};
}
