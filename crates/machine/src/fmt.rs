//! Log forwarding
//!
//! `trace!` .. `error!` forward to `defmt` on hardware builds and to
//! `tracing` on host builds. With neither feature the arguments are only
//! borrowed, so nothing is formatted and no strings are linked in.
//!
//! Arguments must be `&str` or primitives: those are the only types both
//! backends format with a bare `{}`.
#![macro_use]
#![allow(unused_macros)]

macro_rules! log_event {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::$level!($s $(, $x)*);
        #[cfg(feature = "tracing")]
        ::tracing::$level!($s $(, $x)*);
        #[cfg(not(any(feature = "defmt", feature = "tracing")))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_event!(trace, $s $(, $x)*)
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_event!(debug, $s $(, $x)*)
    };
}

macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_event!(info, $s $(, $x)*)
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_event!(warn, $s $(, $x)*)
    };
}

macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_event!(error, $s $(, $x)*)
    };
}
