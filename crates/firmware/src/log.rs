//! Logging shim.
//!
//! Forwards to `defmt` on hardware and to `tracing` in the host simulator.
//! With neither backend enabled the macros still evaluate and borrow their
//! arguments, so a log-only value never trips an unused-variable lint, and
//! compile to nothing else.
//!
//! Format strings must be valid for both backends: plain `{}` / `{:?}` and
//! the `{:#x}` hex hint. No `{=u32}` defmt type annotations.

macro_rules! log_impl {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::$level!($s $(, $x)*);
            #[cfg(feature = "tracing")]
            ::tracing::$level!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt", feature = "tracing")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! trace {
    ($($arg:tt)*) => { log_impl!(trace, $($arg)*) };
}

macro_rules! debug {
    ($($arg:tt)*) => { log_impl!(debug, $($arg)*) };
}

macro_rules! info {
    ($($arg:tt)*) => { log_impl!(info, $($arg)*) };
}

macro_rules! warn {
    ($($arg:tt)*) => { log_impl!(warn, $($arg)*) };
}

macro_rules! error {
    ($($arg:tt)*) => { log_impl!(error, $($arg)*) };
}
