//! Architecture-specific segment reads
//!
//! Only the macOS fast path reads raw memory, so this module is empty on
//! every other target.

cfg_if::cfg_if! {
    if #[cfg(all(target_os = "macos", target_arch = "x86_64"))] {
        pub mod x86_64;
        pub use self::x86_64 as current_arch;
    } else if #[cfg(all(target_os = "macos", target_arch = "x86"))] {
        pub mod x86;
        pub use self::x86 as current_arch;
    }
}
